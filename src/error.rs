use crate::{background::AnnulusError, catalog::CatalogError, region::RegionError, run::RunError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `catalog` module")]
    Catalog(#[from] CatalogError),
    #[error("Error in the `background` module")]
    Annulus(#[from] AnnulusError),
    #[error("Error in the `region` module")]
    Region(#[from] RegionError),
    #[error("Error in the `run` module")]
    Run(#[from] RunError),
}
