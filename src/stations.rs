/// Site registry for the forecast verification service.
///
/// Defines the canonical mapping between the 3-letter verification station
/// ids used by the ASOS archive and the 4-letter site ids written on
/// forecast worksheets. This is the single source of truth for site codes —
/// the scoring core consumes this table rather than owning ad hoc
/// translations, and all other modules should reference sites from here.

// ---------------------------------------------------------------------------
// Site metadata
// ---------------------------------------------------------------------------

/// Metadata for a single verification site.
pub struct Site {
    /// 3-letter verification id, as used in ASOS archive filenames.
    pub verif_id: &'static str,
    /// 4-letter forecast id, as written on worksheets.
    pub forecast_id: &'static str,
    /// Human-readable site name.
    pub name: &'static str,
    /// Whether the site's anemometer is trusted for wind verification.
    /// Sites with a documented sensor problem are skipped for wind only;
    /// their temperature and precipitation records are still verified.
    pub wind_reliable: bool,
}

/// All verified sites. The forecast id is usually the verification id with a
/// `K` prefix, but not always — CLK verifies at Clinton-Sherman (KCSM) and
/// PRX at Hugo (KHHW) — which is why this table exists at all.
pub static SITE_REGISTRY: &[Site] = &[
    Site { verif_id: "ADM", forecast_id: "KADM", name: "Ardmore Municipal", wind_reliable: true },
    Site {
        verif_id: "CLK",
        forecast_id: "KCSM",
        // Anemometer has a documented siting problem; wind obs are not
        // trusted for verification.
        name: "Clinton-Sherman Airfield",
        wind_reliable: false,
    },
    Site { verif_id: "END", forecast_id: "KEND", name: "Vance Air Force Base", wind_reliable: true },
    Site { verif_id: "EYW", forecast_id: "KEYW", name: "Key West Intl", wind_reliable: true },
    Site { verif_id: "GUY", forecast_id: "KGUY", name: "Guymon Municipal", wind_reliable: true },
    Site { verif_id: "LAW", forecast_id: "KLAW", name: "Lawton-Fort Sill", wind_reliable: true },
    Site { verif_id: "LTS", forecast_id: "KLTS", name: "Altus Air Force Base", wind_reliable: true },
    Site { verif_id: "MLC", forecast_id: "KMLC", name: "McAlester Regional", wind_reliable: true },
    Site { verif_id: "OKC", forecast_id: "KOKC", name: "Will Rogers World", wind_reliable: true },
    Site { verif_id: "OUN", forecast_id: "KOUN", name: "Norman Westheimer", wind_reliable: true },
    Site { verif_id: "PRX", forecast_id: "KHHW", name: "Paris / Hugo", wind_reliable: true },
    Site { verif_id: "TUL", forecast_id: "KTUL", name: "Tulsa Intl", wind_reliable: true },
    Site { verif_id: "WWR", forecast_id: "KWWR", name: "Woodward West", wind_reliable: true },
];

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Looks up a site by its 3-letter verification id.
pub fn find_by_verif_id(verif_id: &str) -> Option<&'static Site> {
    SITE_REGISTRY.iter().find(|s| s.verif_id == verif_id)
}

/// Looks up a site by its 4-letter forecast id.
pub fn find_by_forecast_id(forecast_id: &str) -> Option<&'static Site> {
    SITE_REGISTRY.iter().find(|s| s.forecast_id == forecast_id)
}

/// Maps a verification id to its forecast id.
pub fn forecast_id(verif_id: &str) -> Option<&'static str> {
    find_by_verif_id(verif_id).map(|s| s.forecast_id)
}

/// Maps a forecast id back to its verification id.
pub fn verif_id(forecast_id: &str) -> Option<&'static str> {
    find_by_forecast_id(forecast_id).map(|s| s.verif_id)
}

/// Verification ids of all registered sites.
pub fn all_verif_ids() -> Vec<&'static str> {
    SITE_REGISTRY.iter().map(|s| s.verif_id).collect()
}

/// True when the site's wind observations may be used for verification.
/// Unknown sites are not wind-verified.
pub fn wind_verified(verif_id: &str) -> bool {
    find_by_verif_id(verif_id).map(|s| s.wind_reliable).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
