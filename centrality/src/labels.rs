use once_cell::sync::Lazy;
use regex::Regex;
use shared_types::Point;

// Last comma-separated component, trimmed.
static LAST_COMPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([^,]*?)\s*$").expect("Country pattern should compile"));

fn country_of(label: &str) -> Option<&str> {
    LAST_COMPONENT
        .captures(label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|country| !country.is_empty())
}

/// The country suffix every label ends with, if they all share one.
pub fn common_country<'a, I>(points: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Point>,
{
    let mut points = points.into_iter();
    let country = country_of(&points.next()?.label)?;

    points
        .all(|p| country_of(&p.label) == Some(country))
        .then(|| country.to_string())
}

/// List captions for both lists: `"{title} – {label}"` when a title is
/// known, without the country suffix shared by every address and candidate.
pub fn display_labels(addresses: &[Point], candidates: &[Point]) -> (Vec<String>, Vec<String>) {
    let suffix = common_country(addresses.iter().chain(candidates))
        .and_then(|country| Regex::new(&format!(r",\s*{}$", regex::escape(&country))).ok());

    let caption = |p: &Point| {
        let full = match p.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => format!("{} – {}", title, p.label),
            None => p.label.clone(),
        };
        match &suffix {
            Some(re) => re.replace(&full, "").into_owned(),
            None => full,
        }
    };

    (
        addresses.iter().map(&caption).collect(),
        candidates.iter().map(&caption).collect(),
    )
}
