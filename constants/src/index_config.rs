/// INI section holding the pelvis landmark indices
pub const INDEX_SECTION: &str = "Indexies";

/// Key of the left anterior superior iliac spine marker index
pub const LEFT_PELVIS_KEY: &str = "LeftAsis";

/// Key of the right anterior superior iliac spine marker index
pub const RIGHT_PELVIS_KEY: &str = "RightAsis";

/// Key of the sacral marker index
pub const SACRAL_KEY: &str = "VSacral";
