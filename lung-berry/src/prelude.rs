//! 🫁欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::data::window::CtWindow;
pub use crate::data::{CtData3d, LabelMap, LungCt, NiftiHeaderAttr};

pub use crate::error::{PhenoError, PhenoResult};

pub use crate::phenotype::{catalog_names, ParenchymaPhenotypes, Phenotype};
pub use crate::region_type::{ChestConventions, MaskResolver, RegionTypeParser, Selection};
pub use crate::report::{PhenoSink, ResultRow, ResultsTable};

pub use crate::batch::run_cases;
#[cfg(feature = "rayon")]
pub use crate::batch::par_run_cases;

pub use crate::dataset::generic::default_data_loader;
pub use crate::dataset::{self, home_dataset_dir_with};
