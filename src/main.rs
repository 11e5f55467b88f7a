use anyhow::{bail, Context};
use civic_domain::{InstitutionDraft, InstitutionKind, PublicationDraft, SpecialistDraft, SupportGroupDraft};
use civic_workflow::{Catalog, EntityRef, ListingPage, NotificationLevel, SubmissionEngine, SubmissionOutcome};
use flow::RowId;
use std::io::{self, Write};
use std::path::Path;

/// Menú de terminal sobre el motor de envíos.
///
/// Opciones soportadas:
/// 1) Listar instituciones de salud o financieras
/// 2) Listar especialistas
/// 3) Listar publicaciones
/// 4) Ver opciones de ubicación
/// 5) Enviar un borrador desde un archivo JSON
/// 6) Crear grupo de apoyo
/// 7) Eliminar una institución (y sus hijos)
/// 8) Salir
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let engine = SubmissionEngine::from_env().context("no se pudo configurar el cliente REST")?;
    log::info!("panel iniciado contra {}", engine.store().config().base_url);

    loop {
        println!("\n== Panel administrativo ==");
        println!("1) Listar instituciones");
        println!("2) Listar especialistas");
        println!("3) Listar publicaciones");
        println!("4) Ver opciones de ubicación");
        println!("5) Enviar borrador desde archivo JSON");
        println!("6) Crear grupo de apoyo");
        println!("7) Eliminar institución");
        println!("8) Salir");
        let choice = prompt("Elige una opción: ")?;
        match choice.trim() {
            "1" => {
                let kind = match prompt_kind() {
                    Ok(k) => k,
                    Err(e) => { eprintln!("{}", e); continue; }
                };
                let page = prompt_page()?;
                match engine.list_institutions(kind, page).await {
                    Ok(p) => print_page(&p, kind.schema().root.key, kind.schema().name),
                    Err(e) => eprintln!("Error listando instituciones: {}", e),
                }
            }
            "2" => {
                let page = prompt_page()?;
                match engine.list_specialists(page).await {
                    Ok(p) => print_page(&p, "msid", "name"),
                    Err(e) => eprintln!("Error listando especialistas: {}", e),
                }
            }
            "3" => {
                let page = prompt_page()?;
                match engine.list_publications(page).await {
                    Ok(p) => print_page(&p, "publication_id", "publication_title"),
                    Err(e) => eprintln!("Error listando publicaciones: {}", e),
                }
            }
            "4" => match engine.geo_options().await {
                Ok(geo) => {
                    println!("{} provincias, {} ciudades, {} barangays, {} puroks",
                             geo.provinces.len(),
                             geo.cities.len(),
                             geo.barangays.len(),
                             geo.puroks.len());
                    for p in &geo.provinces {
                        println!("  {} | {}", p.code, p.label);
                    }
                }
                Err(e) => eprintln!("Error cargando ubicaciones: {}", e),
            },
            "5" => {
                let path = prompt("Ruta del archivo: ")?;
                let kind = prompt("Tipo (institution | specialist | publication | support_group): ")?;
                match submit_file(&engine, kind.trim(), Path::new(path.trim())).await {
                    Ok(outcome) => report(&outcome),
                    Err(e) => eprintln!("{:#}", e),
                }
            }
            "6" => {
                let name = prompt("Nombre del grupo: ")?;
                let types = engine.catalog_options(Catalog::GroupTypes).await.unwrap_or_default();
                for t in &types {
                    println!("  {} | {}", t.code, t.label);
                }
                let type_code = prompt("Código de tipo: ")?;
                let mut draft = SupportGroupDraft::new(name.trim(), type_code.trim());
                draft.detail = prompt("Detalle (enter para vacío): ")?.trim().to_string();
                draft.founder = prompt("Fundador (enter para vacío): ")?.trim().to_string();
                report(&engine.submit_support_group(&draft).await);
            }
            "7" => {
                let kind = match prompt_kind() {
                    Ok(k) => k,
                    Err(e) => { eprintln!("{}", e); continue; }
                };
                let id = prompt("Id de la institución: ")?;
                let id = match id.trim().parse::<i64>() {
                    Ok(n) => RowId::from(n),
                    Err(_) => { eprintln!("Id inválido"); continue; }
                };
                let confirm = prompt(&format!("Confirma borrado de {}? escribir 'yes' para confirmar: ", id))?;
                if confirm.trim().eq_ignore_ascii_case("yes") {
                    match engine.delete_entity(EntityRef::Institution(kind), &id).await {
                        Ok(()) => println!("Institución eliminada: {}", id),
                        Err(e) => eprintln!("Error eliminando institución: {}", e),
                    }
                } else {
                    println!("Borrado cancelado");
                }
            }
            "8" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

/// Lee un borrador serializado y lo envía.
async fn submit_file<S>(engine: &SubmissionEngine<S>, kind: &str, path: &Path) -> anyhow::Result<SubmissionOutcome>
    where S: flow::TableStore + ?Sized + 'static
{
    let text = std::fs::read_to_string(path).with_context(|| format!("no se pudo leer {}", path.display()))?;
    let outcome = match kind {
        "institution" => engine.submit_institution(&serde_json::from_str::<InstitutionDraft>(&text)?).await,
        "specialist" => engine.submit_specialist(&serde_json::from_str::<SpecialistDraft>(&text)?).await,
        "publication" => engine.submit_publication(&serde_json::from_str::<PublicationDraft>(&text)?).await,
        "support_group" => engine.submit_support_group(&serde_json::from_str::<SupportGroupDraft>(&text)?).await,
        other => bail!("tipo de borrador desconocido: {}", other),
    };
    Ok(outcome)
}

fn report(outcome: &SubmissionOutcome) {
    let n = outcome.notification();
    match n.level {
        NotificationLevel::Failure => eprintln!("[{}] {}", n.title, n.message),
        NotificationLevel::Success | NotificationLevel::Info => println!("[{}] {}", n.title, n.message),
    }
    if let Some(report) = outcome.validation_report() {
        for e in report.errors() {
            eprintln!("  {}: {}", e.field, e.message);
        }
    }
}

fn print_page(page: &ListingPage, key: &str, label: &str) {
    println!("\nPágina {}/{} ({} en total)", page.page, page.page_count.max(1), page.total);
    println!("ID       | NOMBRE");
    println!("------------------------------------------");
    for row in &page.rows {
        let id = row.get(key).and_then(flow::scalar_text).unwrap_or_else(|| "-".into());
        let name = row.get(label).and_then(flow::scalar_text).unwrap_or_else(|| "<sin nombre>".into());
        println!("{:<8} | {}", id, name);
    }
}

fn prompt_kind() -> anyhow::Result<InstitutionKind> {
    let raw = prompt("Tipo (health | financial): ")?;
    Ok(raw.trim().parse::<InstitutionKind>()?)
}

fn prompt_page() -> io::Result<u64> {
    let raw = prompt("Página (enter para 1): ")?;
    Ok(raw.trim().parse().unwrap_or(1))
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
