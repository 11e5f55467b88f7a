// schema.rs
//
// Nombres de tablas y columnas del esquema remoto (fijo). Las dos clases
// de institución comparten la forma del árbol pero no los nombres; aquí
// se concentra esa diferencia para que los flujos sean genéricos.

/// Tabla del esquema: nombre, columna de id y, si es hija, columna que
/// apunta al padre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub table: &'static str,
    pub key: &'static str,
    pub parent: Option<&'static str>,
}

impl TableSpec {
    const fn root(table: &'static str, key: &'static str) -> Self {
        Self { table, key, parent: None }
    }

    const fn child(table: &'static str, key: &'static str, parent: &'static str) -> Self {
        Self { table,
               key,
               parent: Some(parent) }
    }

    /// Columna que apunta al padre (`key` si la tabla es raíz).
    pub fn parent_column(&self) -> &'static str {
        self.parent.unwrap_or(self.key)
    }
}

/// Dónde vive la descripción de la institución.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionStorage {
    /// Columna de la propia fila raíz.
    Inline { column: &'static str },
    /// Fila aparte en una tabla hija (una por institución).
    Separate { table: TableSpec, column: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstitutionSchema {
    pub root: TableSpec,
    pub name: &'static str,
    pub latitude: &'static str,
    pub longitude: &'static str,
    pub province: &'static str,
    pub city: &'static str,
    pub barangay: &'static str,
    pub purok: &'static str,
    pub description: DescriptionStorage,
    pub hours: TableSpec,
    pub hours_day: &'static str,
    pub hours_open: &'static str,
    pub hours_close: &'static str,
    pub contacts: TableSpec,
    pub contact_type: &'static str,
    pub contact_detail: &'static str,
    pub offerings: TableSpec,
    pub offering_name: &'static str,
    pub offering_desc: &'static str,
    pub procedures: TableSpec,
    pub procedure_desc: &'static str,
    pub procedure_seq: &'static str,
    pub requirements: TableSpec,
    pub requirement_desc: &'static str,
    /// Sólo las instituciones financieras registran beneficios.
    pub benefits: Option<TableSpec>,
    pub benefit_desc: &'static str,
    /// Expresión `select=` del listado, con relaciones embebidas.
    pub listing_select: &'static str,
}

pub const HEALTH: InstitutionSchema =
    InstitutionSchema { root: TableSpec::root("health_insti", "health_insti_id"),
                        name: "health_insti_name",
                        latitude: "geo_latitude",
                        longitude: "geo_longhitude",
                        province: "provincial_code",
                        city: "city_zip_code",
                        barangay: "brgy_code",
                        purok: "purok_code",
                        description: DescriptionStorage::Separate { table: TableSpec::child("health_insti_desc",
                                                                                            "health_insti_id",
                                                                                            "health_insti_id"),
                                                                    column: "hospitals_desc_content" },
                        hours: TableSpec::child("insti_ophr", "ophr_id", "health_insti_id"),
                        hours_day: "service_day",
                        hours_open: "service_start_time",
                        hours_close: "service_end_time",
                        contacts: TableSpec::child("health_insti_contacts", "contact_id", "health_insti_id"),
                        contact_type: "contact_type",
                        contact_detail: "contact_detail",
                        offerings: TableSpec::child("health_insti_services", "service_id", "health_insti_id"),
                        offering_name: "service_name",
                        offering_desc: "service_desc",
                        procedures: TableSpec::child("services_procedure", "procedure_id", "service_id"),
                        procedure_desc: "procedure_desc",
                        procedure_seq: "seq_no",
                        requirements: TableSpec::child("service_requirements", "req_id", "service_id"),
                        requirement_desc: "req_desc",
                        benefits: None,
                        benefit_desc: "",
                        listing_select: "*,health_insti_desc(hospitals_desc_content),barangays(brgy_name),cities(city_name),\
                                         provinces(province_name),health_insti_contacts(*),\
                                         health_insti_services(*,services_procedure(*),service_requirements(*))" };

pub const FINANCIAL: InstitutionSchema =
    InstitutionSchema { root: TableSpec::root("financial_institution", "financial_insti_id"),
                        name: "financial_insti_name",
                        // el esquema remoto lo escribe así
                        latitude: "geo_latitutde",
                        longitude: "geo_longhitude",
                        province: "province_code",
                        city: "city_zip_code",
                        barangay: "brgy_code",
                        purok: "purok_code",
                        description: DescriptionStorage::Inline { column: "financial_insti_desc" },
                        hours: TableSpec::child("financial_insti_ophr", "ophr_id", "financial_insti_id"),
                        hours_day: "service_day",
                        hours_open: "service_start_time",
                        hours_close: "service_end_time",
                        contacts: TableSpec::child("financial_contact_details", "contact_details_id", "financial_insti_id"),
                        contact_type: "contact_type",
                        contact_detail: "contact_detail",
                        offerings: TableSpec::child("program_offers", "program_id", "financial_insti_id"),
                        offering_name: "program_name",
                        offering_desc: "program_desc",
                        procedures: TableSpec::child("program_offer_steps", "program_steps_id", "program_id"),
                        procedure_desc: "program_steps_desc",
                        procedure_seq: "seq_no",
                        requirements: TableSpec::child("program_requirements", "program_req_id", "program_id"),
                        requirement_desc: "req_details",
                        benefits: Some(TableSpec::child("program_benefits", "benef_id", "program_id")),
                        benefit_desc: "benef_desc",
                        listing_select: "*,financial_insti_ophr(*),barangays(brgy_name),cities(city_name),\
                                         provinces(province_name),financial_contact_details(*),\
                                         program_offers(*,program_offer_steps(*),program_requirements(*),program_benefits(*))" };

pub mod specialist {
    use super::TableSpec;

    pub const SPECIALIST: TableSpec = TableSpec::root("medical_specialist", "msid");
    pub const ASSIGNMENT: TableSpec =
        TableSpec::child("medical_specialist_health_institution_map", "mshimapid", "msid");
    pub const SCHEDULE: TableSpec = TableSpec::child("schedule_medical_specialist_map", "schedid", "mshimapid");
    pub const LISTING_SELECT: &str =
        "*,medical_specialist_health_institution_map(*,schedule_medical_specialist_map(*),health_insti(health_insti_name))";
}

pub mod publication {
    use super::TableSpec;

    pub const PUBLICATION: TableSpec = TableSpec::root("publications", "publication_id");
    pub const CONTENT: TableSpec = TableSpec::child("publication_content", "publication_id", "publication_id");
    pub const REFERENCE: TableSpec = TableSpec::child("publication_reference", "pub_ref_id", "publication_id");
    pub const LISTING_SELECT: &str = "*,publication_author(author_name),publication_type(publication_type_code,type_description),\
                                      publication_content(content_detail),publication_reference(ref_detail)";
}

pub mod support_group {
    use super::TableSpec;

    pub const SUPPORT_GROUP: TableSpec = TableSpec::root("support_groups", "support_group_id");
    pub const LISTING_SELECT: &str = "*,group_type(group_type_name)";
}

/// Tabla de catálogo simple: código y etiqueta legible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogSpec {
    pub table: &'static str,
    pub key: &'static str,
    pub label: &'static str,
}

pub const PROVINCES: CatalogSpec = CatalogSpec { table: "provinces", key: "province_code", label: "province_name" };
pub const CITIES: CatalogSpec = CatalogSpec { table: "cities", key: "city_zip_code", label: "city_name" };
pub const BARANGAYS: CatalogSpec = CatalogSpec { table: "barangays", key: "brgy_code", label: "brgy_name" };
pub const PUROKS: CatalogSpec = CatalogSpec { table: "puroks", key: "purok_code", label: "purok_name" };
pub const PUBLICATION_TYPES: CatalogSpec =
    CatalogSpec { table: "publication_type", key: "publication_type_code", label: "type_description" };
pub const PUBLICATION_AUTHORS: CatalogSpec =
    CatalogSpec { table: "publication_author", key: "author_id", label: "author_name" };
pub const GROUP_TYPES: CatalogSpec = CatalogSpec { table: "group_type", key: "group_type_code", label: "group_type_name" };
pub const SUPPORT_GROUPS: CatalogSpec = CatalogSpec { table: "support_groups", key: "support_group_id", label: "group_name" };

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offerings_hang_from_the_root_key() {
        for s in [HEALTH, FINANCIAL] {
            assert_eq!(s.offerings.parent, Some(s.root.key));
            assert_eq!(s.procedures.parent, Some(s.offerings.key));
            assert_eq!(s.requirements.parent, Some(s.offerings.key));
            assert_eq!(s.hours.parent, Some(s.root.key));
        }
        assert!(HEALTH.benefits.is_none());
        assert_eq!(FINANCIAL.benefits.map(|b| b.parent_column()), Some("program_id"));
    }

    #[test]
    fn listing_select_has_no_stray_whitespace() {
        assert!(!HEALTH.listing_select.contains(' '));
        assert!(!FINANCIAL.listing_select.contains(' '));
        assert!(!publication::LISTING_SELECT.contains(' '));
    }
}
