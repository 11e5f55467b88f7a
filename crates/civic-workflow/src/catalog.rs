// catalog.rs
//
// Catálogos simples (geografía, tipos y autores de publicación, tipos de
// grupo) y su CRUD directo: una llamada por operación, sin árbol.
use crate::engine::SubmissionEngine;
use crate::errors::{Result, WorkflowError};
use crate::listing::ListingPage;
use civic_domain::schema::{self, CatalogSpec};
use civic_domain::{Barangay, City, GeoLevel, LookupOption, Province, Purok};
use flow::{Filter, FlowError, Prefer, Row, RowId, SelectQuery, TableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Catalog {
    Provinces,
    Cities,
    Barangays,
    Puroks,
    PublicationTypes,
    PublicationAuthors,
    GroupTypes,
    SupportGroups,
}

impl Catalog {
    pub const ALL: [Catalog; 8] = [Self::Provinces,
                                   Self::Cities,
                                   Self::Barangays,
                                   Self::Puroks,
                                   Self::PublicationTypes,
                                   Self::PublicationAuthors,
                                   Self::GroupTypes,
                                   Self::SupportGroups];

    pub fn spec(&self) -> CatalogSpec {
        match self {
            Self::Provinces => schema::PROVINCES,
            Self::Cities => schema::CITIES,
            Self::Barangays => schema::BARANGAYS,
            Self::Puroks => schema::PUROKS,
            Self::PublicationTypes => schema::PUBLICATION_TYPES,
            Self::PublicationAuthors => schema::PUBLICATION_AUTHORS,
            Self::GroupTypes => schema::GROUP_TYPES,
            Self::SupportGroups => schema::SUPPORT_GROUPS,
        }
    }
}

impl From<GeoLevel> for Catalog {
    fn from(level: GeoLevel) -> Self {
        match level {
            GeoLevel::Province => Self::Provinces,
            GeoLevel::City => Self::Cities,
            GeoLevel::Barangay => Self::Barangays,
            GeoLevel::Purok => Self::Puroks,
        }
    }
}

/// Las cuatro listas de los desplegables de ubicación.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoOptions {
    pub provinces: Vec<Province>,
    pub cities: Vec<City>,
    pub barangays: Vec<Barangay>,
    pub puroks: Vec<Purok>,
}

impl GeoOptions {
    /// Carga las cuatro listas a la vez. Cada una se lee completa: un nivel
    /// no filtra al siguiente.
    pub async fn fetch<S>(store: &S) -> Result<Self>
        where S: TableStore + ?Sized
    {
        let (provinces, cities, barangays, puroks) = tokio::try_join!(options(store, GeoLevel::Province.spec()),
                                                                      options(store, GeoLevel::City.spec()),
                                                                      options(store, GeoLevel::Barangay.spec()),
                                                                      options(store, GeoLevel::Purok.spec()))?;
        Ok(Self { provinces,
                  cities,
                  barangays,
                  puroks })
    }
}

async fn options<S>(store: &S, spec: CatalogSpec) -> Result<Vec<LookupOption>>
    where S: TableStore + ?Sized
{
    let result = store.select(spec.table, &SelectQuery::all()).await?;
    Ok(LookupOption::from_rows(&spec, &result.rows)?)
}

impl<S> SubmissionEngine<S> where S: TableStore + ?Sized + 'static
{
    pub async fn catalog_page(&self, catalog: Catalog, page: u64) -> Result<ListingPage> {
        self.fetch_page(catalog.spec().table, "*", page).await
    }

    /// Todas las opciones del catálogo, para un desplegable.
    pub async fn catalog_options(&self, catalog: Catalog) -> Result<Vec<LookupOption>> {
        let spec = catalog.spec();
        let result = self.cache().fetch(self.store().as_ref(), spec.table, &SelectQuery::all()).await?;
        Ok(LookupOption::from_rows(&spec, &result.rows)?)
    }

    pub async fn geo_options(&self) -> Result<GeoOptions> {
        GeoOptions::fetch(self.store().as_ref()).await
    }

    /// Alta en el catálogo. Devuelve la fila creada.
    pub async fn catalog_add(&self, catalog: Catalog, row: Row) -> Result<Row> {
        let spec = catalog.spec();
        let created = self.store().insert(spec.table, row, Prefer::ReturnRepresentation).await?;
        self.invalidate(spec.table);
        created.into_iter().next().ok_or_else(|| {
                                       WorkflowError::Flow(FlowError::MissingIdentifier { table: spec.table.to_string(),
                                                                                          key_column: spec.key.to_string() })
                                   })
    }

    pub async fn catalog_update(&self, catalog: Catalog, id: &RowId, patch: Row) -> Result<Vec<Row>> {
        let spec = catalog.spec();
        let updated = self.store().update(spec.table, &Filter::eq(spec.key, id), patch).await?;
        self.invalidate(spec.table);
        if updated.is_empty() {
            log::warn!("{} {}: ninguna fila actualizada", spec.table, id);
        }
        Ok(updated)
    }

    pub async fn catalog_remove(&self, catalog: Catalog, id: &RowId) -> Result<()> {
        let spec = catalog.spec();
        self.store().delete(spec.table, &Filter::eq(spec.key, id)).await?;
        self.invalidate(spec.table);
        Ok(())
    }
}
