/// Data loading for the verification batch.
///
/// All I/O happens here, before scoring begins: the scoring core only ever
/// sees fully loaded archives.
///
/// Submodules:
/// - `iem` — IEM ASOS observation archives (local files or HTTP fetch).
/// - `forecast` — fixed-width forecast worksheet files.

pub mod forecast;
pub mod iem;
