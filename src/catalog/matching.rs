//! Query building and best-candidate selection for chart lookups.

use crate::catalog::CatalogTrack;
use crate::foundation::utils::match_key;

fn unquoted(value: &str) -> String {
    value.replace('"', "").trim().to_string()
}

/// Field-qualified query, e.g. `track:"Mood" artist:"24kGoldn"`.
pub fn advanced_query(song: &str, performer: &str) -> String {
    format!(
        "track:\"{}\" artist:\"{}\"",
        unquoted(song),
        unquoted(performer)
    )
}

/// Plain query used when the qualified one finds nothing.
pub fn naive_query(song: &str, performer: &str) -> String {
    format!("{} {}", unquoted(song), unquoted(performer))
}

/// Picks the candidate that best represents a chart entry.
///
/// Candidates whose title matches the chart title (after [`match_key`]) win
/// over the rest. Within that pool the album released closest to the chart
/// year is chosen, so a 1984 chart week prefers the original release over a
/// 2011 remaster. Ties keep the provider's ranking.
pub fn pick_best_match<'a>(
    candidates: &'a [CatalogTrack],
    song: &str,
    chart_year: i32,
) -> Option<&'a CatalogTrack> {
    let wanted = match_key(song);
    let exact: Vec<&CatalogTrack> = candidates
        .iter()
        .filter(|candidate| match_key(&candidate.name) == wanted)
        .collect();

    let pool: Vec<&CatalogTrack> = if exact.is_empty() {
        candidates.iter().collect()
    } else {
        exact
    };

    pool.into_iter().min_by_key(|candidate| {
        candidate
            .release_year()
            .map(|year| (i64::from(year) - i64::from(chart_year)).abs())
            .unwrap_or(i64::MAX)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, name: &str, release_date: Option<&str>) -> CatalogTrack {
        CatalogTrack {
            id: id.into(),
            name: name.into(),
            artists: vec!["Someone".into()],
            album_name: None,
            release_date: release_date.map(str::to_string),
            image_url: None,
            duration_ms: None,
            explicit: None,
            popularity: None,
            track_url: None,
        }
    }

    #[test]
    fn test_queries() {
        assert_eq!(
            advanced_query("Mood", "24kGoldn"),
            "track:\"Mood\" artist:\"24kGoldn\""
        );
        assert_eq!(
            advanced_query("Say \"Yes\"", "Floetry"),
            "track:\"Say Yes\" artist:\"Floetry\""
        );
        assert_eq!(naive_query("Mood", "24kGoldn"), "Mood 24kGoldn");
    }

    #[test]
    fn test_empty_candidates() {
        assert!(pick_best_match(&[], "Anything", 2000).is_none());
    }

    #[test]
    fn test_prefers_closest_release_year() {
        let candidates = vec![
            candidate("remaster", "Jump", Some("2015-03-01")),
            candidate("original", "Jump", Some("1984-01-09")),
            candidate("live", "Jump", Some("1993")),
        ];
        let best = pick_best_match(&candidates, "Jump", 1984).unwrap();
        assert_eq!(best.id, "original");
    }

    #[test]
    fn test_exact_title_beats_closer_year() {
        let candidates = vec![
            candidate("cover", "Jump Around", Some("1984")),
            candidate("song", "JUMP (Remastered)", Some("2015")),
        ];
        let best = pick_best_match(&candidates, "Jump", 1984).unwrap();
        assert_eq!(best.id, "song");
    }

    #[test]
    fn test_ties_and_unknown_years_keep_provider_order() {
        let candidates = vec![
            candidate("first", "Other", None),
            candidate("second", "Other", None),
        ];
        let best = pick_best_match(&candidates, "Song", 2001).unwrap();
        assert_eq!(best.id, "first");
    }
}
