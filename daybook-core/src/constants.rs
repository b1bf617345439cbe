/// Appended to entity ids to form the ICS `UID`.
pub const UID_DOMAIN_SUFFIX: &str = "@daybook.app";

/// `PRODID` line emitted in every export.
pub const PRODUCT_ID: &str = "-//Daybook//Calendar Export//EN";

/// Creator used when the form leaves it blank.
pub const DEFAULT_CREATOR: &str = "Task App User";

/// MIME type handed to the share facility.
pub const ICS_MIME_TYPE: &str = "text/calendar";

/// Upper bound on marker dots drawn for a single day.
pub const DEFAULT_MAX_DOTS_PER_DAY: usize = 3;

/// Dot colors, picked by the entity's position within its day.
pub const MARKER_PALETTE: [&str; 5] = ["#4f8ef7", "#5cb85c", "#f0ad4e", "#d9534f", "#9b59b6"];

/// Color of the "selected day" marker.
pub const SELECTED_COLOR: &str = "#00adf5";
