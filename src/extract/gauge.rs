/// Conservation gauge images and the status each one shows.
const GAUGE_STATUSES: [(&str, &str); 4] = [
    ("gauge1.jpg", "Low Usage"),
    ("gauge2.jpg", "Moderate Usage"),
    ("gauge3.jpg", "Peak Usage"),
    ("gauge4.jpg", "Critical Peak"),
];

/// Status for one image `src`. The gauge file name may appear anywhere in
/// it, including a query string or a proxy path.
pub fn status_for_src(src: &str) -> Option<&'static str> {
    GAUGE_STATUSES
        .iter()
        .find(|(name, _)| src.contains(*name))
        .map(|(_, status)| *status)
}

/// Status of the first gauge image on the page.
pub fn conservation_status(images: &[String]) -> Option<&'static str> {
    images.iter().find_map(|src| status_for_src(src))
}
