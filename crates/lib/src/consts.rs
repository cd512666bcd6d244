pub const APP_NAME: &str = "shipyard";

/// Default product metadata file, relative to the working directory.
pub const PRODUCT_FILE: &str = "product.json";

/// Default root for everything a build writes.
pub const OUTPUT_DIR: &str = "out";

/// File name of the artifact manifest written at the end of a build.
pub const ARTIFACT_MANIFEST_FILE: &str = "artifacts.json";

pub const ENV_TARGET_OS: &str = "SHIPYARD_TARGET_OS";
pub const ENV_SKIP_STEPS: &str = "SHIPYARD_SKIP_STEPS";
pub const ENV_PARALLEL: &str = "SHIPYARD_PARALLEL";
pub const ENV_JOBS: &str = "SHIPYARD_JOBS";
pub const ENV_JOIN_ORDER: &str = "SHIPYARD_JOIN_ORDER";
pub const ENV_OUTPUT_DIR: &str = "SHIPYARD_OUTPUT_DIR";

/// Scope name of the root context in the event journal.
pub const ROOT_SCOPE: &str = "root";
