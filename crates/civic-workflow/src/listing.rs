// listing.rs
//
// Listados paginados de las pantallas de administración, servidos a través
// de la `ListingCache` del motor.
use crate::engine::SubmissionEngine;
use crate::errors::Result;
use civic_domain::schema::{publication, specialist, support_group};
use civic_domain::InstitutionKind;
use civic_persistence::page_count;
use flow::{PageRequest, Row, SelectQuery, TableStore};

/// Pantallas de listado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Institutions(InstitutionKind),
    Specialists,
    Publications,
    SupportGroups,
}

impl Listing {
    pub fn table(&self) -> &'static str {
        match self {
            Self::Institutions(kind) => kind.schema().root.table,
            Self::Specialists => specialist::SPECIALIST.table,
            Self::Publications => publication::PUBLICATION.table,
            Self::SupportGroups => support_group::SUPPORT_GROUP.table,
        }
    }

    /// Expresión `select=` con las relaciones embebidas que muestra la
    /// pantalla.
    pub fn select(&self) -> &'static str {
        match self {
            Self::Institutions(kind) => kind.schema().listing_select,
            Self::Specialists => specialist::LISTING_SELECT,
            Self::Publications => publication::LISTING_SELECT,
            Self::SupportGroups => support_group::LISTING_SELECT,
        }
    }
}

/// Una página de resultados.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPage {
    pub rows: Vec<Row>,
    /// Total según `Content-Range`; sin cabecera, las filas recibidas.
    pub total: u64,
    pub page: u64,
    pub page_count: u64,
}

impl<S> SubmissionEngine<S> where S: TableStore + ?Sized + 'static
{
    /// Página `page` (1-based) de `table`, con el tamaño configurado.
    pub async fn fetch_page(&self, table: &str, select: &str, page: u64) -> Result<ListingPage> {
        let request = PageRequest::new(page, self.config().page_size);
        let query = SelectQuery::all().columns(select).page(request).count_exact();
        let result = self.cache().fetch(self.store().as_ref(), table, &query).await?;
        let total = result.total.unwrap_or(result.rows.len() as u64);
        Ok(ListingPage { rows: result.rows,
                         total,
                         page: request.page,
                         page_count: page_count(total, request.page_size) })
    }

    pub async fn list(&self, listing: Listing, page: u64) -> Result<ListingPage> {
        self.fetch_page(listing.table(), listing.select(), page).await
    }

    pub async fn list_institutions(&self, kind: InstitutionKind, page: u64) -> Result<ListingPage> {
        self.list(Listing::Institutions(kind), page).await
    }

    pub async fn list_specialists(&self, page: u64) -> Result<ListingPage> {
        self.list(Listing::Specialists, page).await
    }

    pub async fn list_publications(&self, page: u64) -> Result<ListingPage> {
        self.list(Listing::Publications, page).await
    }

    pub async fn list_support_groups(&self, page: u64) -> Result<ListingPage> {
        self.list(Listing::SupportGroups, page).await
    }
}
