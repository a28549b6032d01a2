//! Reputation badge rendering.
//!
//! Badges are plain string templates. Colour follows the score band and the
//! verification level is printed as text next to the score.

use nanda_core::types::VerificationLevel;

const COLOUR_HIGH: &str = "#4c1";
const COLOUR_GOOD: &str = "#97ca00";
const COLOUR_FAIR: &str = "#dfb317";
const COLOUR_LOW: &str = "#e05d44";

/// Fill colour for a score: ≥80 green, ≥60 yellow-green, ≥40 yellow, else red.
pub fn badge_colour(overall_score: f64) -> &'static str {
    match overall_score {
        s if s >= 80.0 => COLOUR_HIGH,
        s if s >= 60.0 => COLOUR_GOOD,
        s if s >= 40.0 => COLOUR_FAIR,
        _ => COLOUR_LOW,
    }
}

/// Escape text for inclusion in XML/HTML content or attribute values.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn score_label(overall_score: f64) -> String {
    format!("{:.0}", overall_score.clamp(0.0, 100.0))
}

pub fn render_svg_badge(
    subject_id: &str,
    overall_score: f64,
    verification_level: VerificationLevel,
) -> String {
    let colour = badge_colour(overall_score);
    let score = score_label(overall_score);
    let subject = escape_markup(subject_id);
    let level = verification_level.as_str();

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="180" height="20" role="img" aria-label="reputation: {score}">
  <title>{subject}: reputation {score} ({level})</title>
  <rect width="80" height="20" fill="#555"/>
  <rect x="80" width="100" height="20" fill="{colour}"/>
  <g fill="#fff" text-anchor="middle" font-family="Verdana,Geneva,sans-serif" font-size="11">
    <text x="40" y="14">reputation</text>
    <text x="130" y="14">{score} · {level}</text>
  </g>
</svg>"##
    )
}

pub fn render_html_badge(
    subject_id: &str,
    overall_score: f64,
    verification_level: VerificationLevel,
) -> String {
    let colour = badge_colour(overall_score);
    let score = score_label(overall_score);
    let subject = escape_markup(subject_id);
    let level = verification_level.as_str();

    format!(
        r#"<div class="nanda-badge" data-subject="{subject}" style="display:inline-flex;font-family:sans-serif;font-size:12px;border-radius:3px;overflow:hidden">
  <span style="background:#555;color:#fff;padding:2px 6px">{subject}</span>
  <span style="background:{colour};color:#fff;padding:2px 6px">{score}</span>
  <span style="background:#333;color:#fff;padding:2px 6px">{level}</span>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_bands() {
        assert_eq!(badge_colour(100.0), COLOUR_HIGH);
        assert_eq!(badge_colour(80.0), COLOUR_HIGH);
        assert_eq!(badge_colour(79.9), COLOUR_GOOD);
        assert_eq!(badge_colour(60.0), COLOUR_GOOD);
        assert_eq!(badge_colour(40.0), COLOUR_FAIR);
        assert_eq!(badge_colour(39.0), COLOUR_LOW);
        assert_eq!(badge_colour(f64::NAN), COLOUR_LOW);
    }

    #[test]
    fn svg_contains_score_and_level() {
        let svg = render_svg_badge("agent-7", 97.0, VerificationLevel::Gold);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("97 · gold"));
        assert!(svg.contains(COLOUR_HIGH));
        assert!(svg.contains("agent-7"));
    }

    #[test]
    fn subject_id_is_escaped() {
        let svg = render_svg_badge("<script>\"x\"</script>", 50.0, VerificationLevel::None);
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&lt;script&gt;&quot;x&quot;&lt;/script&gt;"));

        let html = render_html_badge("a&b'", 50.0, VerificationLevel::Bronze);
        assert!(html.contains("a&amp;b&#39;"));
        assert!(html.contains("bronze"));
        assert!(html.contains(COLOUR_FAIR));
    }

    #[test]
    fn score_label_is_clamped_integer() {
        assert!(render_html_badge("s", 150.4, VerificationLevel::Silver).contains(">100<"));
        assert!(render_html_badge("s", 64.6, VerificationLevel::Silver).contains(">65<"));
    }
}
