pub mod activity;
pub mod app_state;
pub mod bundle;
pub mod category;
pub mod export;
pub mod ids;
pub mod link;
pub mod share;
pub mod storage;

pub use activity::{ActivityUpdate, NewActivity, ScheduledActivity, parse_time};
pub use app_state::{AppState, DataStats};
pub use bundle::{Bundle, BundleUpdate, NewBundle};
pub use category::{
    Category, CategoryUpdate, DEFAULT_CATEGORIES, FALLBACK_CATEGORY_NAME, NewCategory,
    default_categories,
};
pub use export::{
    ExportFormat, ValidationError, default_export_file_name, export_to_file, import_from_file,
    parse_import,
};
pub use ids::EntityId;
pub use link::{Link, LinkUpdate, NewLink, SocialMediaType, normalize_url};
pub use share::{
    ShareCodeError, SharedBundle, SharedLink, decode_share_code, encode_share_code,
    extract_share_code, share_url,
};
pub use storage::{SlotContents, StorageError, StorageManager};
