pub mod completeness;
pub mod debounce;
pub mod draft;
pub mod lists;
pub mod mask;
pub mod state;
pub mod validation;

pub use completeness::{completeness, progress, section_checklist, Completeness, CompletenessStatus};
pub use debounce::{spawn_debounced_validator, Debouncer};
pub use draft::{AutoSaver, Draft, DraftOffer, DraftStore};
pub use lists::{DynamicList, ListEntry};
pub use mask::{mask_sensitive, unmask, MaskKind};
pub use state::FormState;
pub use validation::{validate_field, validate_for_submit, validate_realtime, ErrorMap, FieldRules};
