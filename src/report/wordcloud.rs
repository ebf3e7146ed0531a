//! Word clouds.
//!
//! A corpus is tokenized, stopwords are removed and the remaining words
//! are placed along an Archimedean spiral, largest first. Placement only
//! depends on the input, so the same corpus always yields the same page.

use super::backend::{is_win_ansi, text_extent};
use super::charts::{draw_empty, FONT, TITLE_SIZE};
use crate::config::EmptyInputPolicy;
use crate::models::TextCorpus;
use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Most words placed on one cloud.
pub const MAX_WORDS: usize = 200;

const MIN_FONT: f64 = 10.0;
/// Largest font as a fraction of the canvas height.
const MAX_FONT_RATIO: f64 = 0.22;
const SHRINK: f64 = 0.8;
const SPIRAL_STEP: f64 = 0.3;
const SPIRAL_SPACING: f64 = 3.0;
const PADDING: i32 = 2;

const PALETTE: [RGBColor; 6] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(229, 108, 26),
    RGBColor(177, 42, 144),
];

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "can't", "cannot", "com", "could", "couldn't", "did", "didn't",
    "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else", "ever", "few",
    "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he", "he'd", "he'll", "he's", "hence", "her", "here", "here's", "hers",
    "herself", "him", "himself", "his", "how", "how's", "however", "http", "https", "i", "i'd",
    "i'll", "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself",
    "just", "k", "let's", "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor",
    "not", "of", "off", "on", "once", "only", "or", "other", "otherwise", "ought", "our",
    "ours", "ourselves", "out", "over", "own", "r", "same", "shall", "shan't", "she", "she'd",
    "she'll", "she's", "should", "shouldn't", "since", "so", "some", "such", "than", "that",
    "that's", "the", "their", "theirs", "them", "themselves", "then", "there", "there's",
    "therefore", "these", "they", "they'd", "they'll", "they're", "they've", "this", "those",
    "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we", "we'd",
    "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's", "where",
    "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with", "won't",
    "would", "wouldn't", "www", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

pub fn is_stopword(word: &str) -> bool {
    stopwords().contains(word.to_lowercase().as_str())
}

/// Word tokens of `text`: runs of word characters with inner apostrophes.
/// Possessive `'s` is dropped. Tokens shorter than two characters, made
/// only of digits, or not drawable with the built-in fonts are skipped.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '\''))
        .map(|raw| raw.trim_matches('\''))
        .map(|token| {
            if token.len() > 2 && (token.ends_with("'s") || token.ends_with("'S")) {
                &token[..token.len() - 2]
            } else {
                token
            }
        })
        .filter(|token| token.chars().filter(|c| *c != '\'').count() >= 2)
        .filter(|token| !token.chars().all(|c| c.is_ascii_digit()))
        .filter(|token| token.chars().all(is_win_ansi))
        .collect()
}

/// Word frequencies, most frequent first, stopwords removed.
///
/// Case variants are merged; the variant used most often is displayed.
pub fn word_frequencies(text: &str) -> Vec<(String, usize)> {
    let mut variants: HashMap<String, HashMap<&str, usize>> = HashMap::new();

    for token in tokenize(text) {
        let key = token.to_lowercase();
        if is_stopword(&key) {
            continue;
        }
        *variants.entry(key).or_default().entry(token).or_default() += 1;
    }

    let mut frequencies: Vec<(String, usize)> = variants
        .into_values()
        .map(|forms| {
            let total = forms.values().sum();
            let display = forms
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
                .map(|(form, _)| form.to_string())
                .unwrap_or_default();
            (display, total)
        })
        .collect();

    frequencies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    frequencies
}

/// A word with its font size and bounding box (top-left origin).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub size: f64,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PlacedWord {
    fn overlaps(&self, other: &PlacedWord) -> bool {
        self.x < other.x + other.width + PADDING
            && other.x < self.x + self.width + PADDING
            && self.y < other.y + other.height + PADDING
            && other.y < self.y + self.height + PADDING
    }
}

/// Place up to [`MAX_WORDS`] words on a `width` x `height` canvas.
pub fn layout(frequencies: &[(String, usize)], width: u32, height: u32) -> Vec<PlacedWord> {
    let mut placed: Vec<PlacedWord> = Vec::new();
    let Some(max_count) = frequencies.first().map(|(_, count)| *count as f64) else {
        return placed;
    };

    let max_font = (height as f64 * MAX_FONT_RATIO).max(MIN_FONT);

    for (word, count) in frequencies.iter().take(MAX_WORDS) {
        let mut size = MIN_FONT + (max_font - MIN_FONT) * (*count as f64 / max_count);

        while size >= MIN_FONT {
            if let Some(spot) = find_spot(word, size, width, height, &placed) {
                placed.push(spot);
                break;
            }
            size *= SHRINK;
        }
    }

    placed
}

fn find_spot(
    word: &str,
    size: f64,
    width: u32,
    height: u32,
    placed: &[PlacedWord],
) -> Option<PlacedWord> {
    let (w, h) = text_extent(word, size);
    let (w, h) = (w.ceil() as i32, h.ceil() as i32);
    if w > width as i32 || h > height as i32 {
        return None;
    }

    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let max_radius = (cx * cx + cy * cy).sqrt();
    let mut theta: f64 = 0.0;

    loop {
        let radius = SPIRAL_SPACING * theta;
        if radius > max_radius {
            return None;
        }

        let candidate = PlacedWord {
            text: word.to_string(),
            size,
            x: (cx + radius * theta.cos()) as i32 - w / 2,
            y: (cy + radius * theta.sin()) as i32 - h / 2,
            width: w,
            height: h,
        };

        let inside = candidate.x >= 0
            && candidate.y >= 0
            && candidate.x + w <= width as i32
            && candidate.y + h <= height as i32;

        if inside && placed.iter().all(|other| !candidate.overlaps(other)) {
            return Some(candidate);
        }

        theta += SPIRAL_STEP;
    }
}

/// Draw a titled word cloud of `corpus` filling `area`.
pub fn draw_word_cloud<DB>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    corpus: &TextCorpus,
    policy: EmptyInputPolicy,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;

    let frequencies = if corpus.is_blank() {
        Vec::new()
    } else {
        word_frequencies(corpus.as_str())
    };
    if frequencies.is_empty() {
        return draw_empty(area, title, policy);
    }

    let body = area.titled(title, (FONT, TITLE_SIZE))?;
    let (width, height) = body.dim_in_pixel();

    for (index, word) in layout(&frequencies, width, height).iter().enumerate() {
        let style = (FONT, word.size)
            .into_font()
            .color(&PALETTE[index % PALETTE.len()])
            .pos(Pos::new(HPos::Left, VPos::Top));
        body.draw(&Text::new(word.text.as_str(), (word.x, word.y), style))?;
    }

    Ok(())
}
