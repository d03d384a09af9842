//! Keyword-based prompt classification.
//!
//! Free text is matched against three independent axes (subject, style,
//! atmosphere). Each axis is an ordered list of rows; the first row whose
//! keyword appears as a substring of the lowercased input wins, and an axis
//! with no match falls back to its default label. Row order is significant
//! and is preserved from the config file.

pub const SUBJECT_FALLBACK: &str = "A cinematic scene";
pub const STYLE_FALLBACK: &str = "hyper-realistic digital art";
pub const ATMOSPHERE_FALLBACK: &str = "cinematic lighting";

/// Trailing Korean particles stripped after the translation pass.
const TRAILING_PARTICLES: &[char] = &[
    '을', '를', '이', '가', '은', '는', '의', '에', '로', '와', '과', '도',
];

#[derive(Debug, Clone)]
pub struct AxisRow {
    pub category: String,
    pub label: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Axis {
    pub fallback: String,
    pub rows: Vec<AxisRow>,
}

#[derive(Debug, Clone)]
pub struct AxisMatch {
    pub category: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Classification {
    pub subject: AxisMatch,
    pub style: AxisMatch,
    pub atmosphere: AxisMatch,
}

#[derive(Debug, Clone)]
pub struct ClassifierTables {
    pub subject: Axis,
    pub style: Axis,
    pub atmosphere: Axis,
    translations: Vec<(String, String)>,
}

impl Axis {
    fn resolve(&self, lowered: &str) -> AxisMatch {
        for row in &self.rows {
            if row.keywords.iter().any(|kw| lowered.contains(kw.as_str())) {
                return AxisMatch {
                    category: Some(row.category.clone()),
                    label: row.label.clone(),
                };
            }
        }

        AxisMatch {
            category: None,
            label: self.fallback.clone(),
        }
    }
}

impl ClassifierTables {
    pub fn new(
        subject: Axis,
        style: Axis,
        atmosphere: Axis,
        mut translations: Vec<(String, String)>,
    ) -> Self {
        // Longest phrase first so "우주 고래" is replaced before "우주".
        translations.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self {
            subject,
            style,
            atmosphere,
            translations,
        }
    }

    pub fn builtin() -> Self {
        Self::new(
            builtin_axis(SUBJECT_FALLBACK, BUILTIN_SUBJECT_ROWS),
            builtin_axis(STYLE_FALLBACK, BUILTIN_STYLE_ROWS),
            builtin_axis(ATMOSPHERE_FALLBACK, BUILTIN_ATMOSPHERE_ROWS),
            BUILTIN_TRANSLATIONS
                .iter()
                .map(|(ko, en)| (ko.to_string(), en.to_string()))
                .collect(),
        )
    }

    /// Best-effort bilingual normalization: fixed-phrase Korean replacement
    /// followed by trailing-particle stripping. Not a translation guarantee.
    pub fn normalize_input(&self, text: &str) -> String {
        let mut normalized = text.trim().to_string();
        for (phrase, replacement) in &self.translations {
            if normalized.contains(phrase.as_str()) {
                normalized = normalized.replace(phrase.as_str(), replacement);
            }
        }

        normalized
            .split_whitespace()
            .map(strip_trailing_particle)
            .collect::<Vec<&str>>()
            .join(" ")
    }

    /// Axes are evaluated independently; a subject match never influences
    /// style or atmosphere resolution.
    pub fn classify(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();
        Classification {
            subject: self.subject.resolve(&lowered),
            style: self.style.resolve(&lowered),
            atmosphere: self.atmosphere.resolve(&lowered),
        }
    }
}

fn strip_trailing_particle(token: &str) -> &str {
    let mut chars = token.char_indices();
    let Some((last_index, last_char)) = chars.next_back() else {
        return token;
    };
    if last_index == 0 || !TRAILING_PARTICLES.contains(&last_char) {
        return token;
    }
    &token[..last_index]
}

fn builtin_axis(fallback: &str, rows: &[(&str, &str, &[&str])]) -> Axis {
    Axis {
        fallback: fallback.to_string(),
        rows: rows
            .iter()
            .map(|(category, label, keywords)| AxisRow {
                category: category.to_string(),
                label: label.to_string(),
                keywords: keywords.iter().map(|kw| kw.to_lowercase()).collect(),
            })
            .collect(),
    }
}

pub(crate) const BUILTIN_SUBJECT_ROWS: &[(&str, &str, &[&str])] = &[
    (
        "technology",
        "A cutting-edge technological vision",
        &[
            "robot", "cyborg", "mech", "android", "spaceship", "space", "drone", "machine",
            "futuristic", "로봇", "우주", "기계",
        ],
    ),
    (
        "nature",
        "A breathtaking natural landscape",
        &[
            "forest", "mountain", "ocean", "river", "flower", "tree", "desert", "waterfall",
            "숲", "산", "바다", "꽃",
        ],
    ),
    (
        "character",
        "A striking character portrait",
        &[
            "girl", "boy", "woman", "man", "warrior", "knight", "wizard", "samurai", "princess",
            "소녀", "소년", "전사", "기사",
        ],
    ),
    (
        "creature",
        "A majestic creature study",
        &[
            "cat", "dog", "dragon", "wolf", "bird", "whale", "fox", "tiger",
            "고양이", "강아지", "늑대", "호랑이",
        ],
    ),
    (
        "city",
        "An atmospheric urban scene",
        &[
            "city", "street", "alley", "skyline", "rooftop", "market",
            "도시", "거리", "골목",
        ],
    ),
];

pub(crate) const BUILTIN_STYLE_ROWS: &[(&str, &str, &[&str])] = &[
    (
        "anime",
        "in expressive anime style",
        &["anime", "manga", "ghibli", "cel shaded", "애니", "만화"],
    ),
    (
        "painting",
        "as a classical oil painting",
        &[
            "oil painting", "watercolor", "impressionist", "canvas", "brushstroke",
            "유화", "수채화",
        ],
    ),
    (
        "cyberpunk",
        "in gritty cyberpunk style",
        &["cyberpunk", "dystopia", "holographic", "사이버펑크"],
    ),
    (
        "pixel",
        "as retro pixel art",
        &["pixel", "8-bit", "16-bit", "sprite", "픽셀"],
    ),
    (
        "photo",
        "as an ultra-sharp photograph",
        &["photo", "photograph", "dslr", "35mm", "사진"],
    ),
];

pub(crate) const BUILTIN_ATMOSPHERE_ROWS: &[(&str, &str, &[&str])] = &[
    (
        "warm",
        "bathed in golden hour glow",
        &["sunset", "golden hour", "warm", "dawn", "노을", "석양"],
    ),
    (
        "dark",
        "shrouded in moody darkness",
        &["dark", "night", "shadow", "noir", "storm", "밤", "어둠"],
    ),
    (
        "dreamy",
        "wrapped in dreamy pastel haze",
        &["dream", "pastel", "soft", "fog", "mist", "꿈", "안개"],
    ),
    (
        "vivid",
        "charged with vivid neon energy",
        &["neon", "vibrant", "electric", "glow", "네온"],
    ),
];

pub(crate) const BUILTIN_TRANSLATIONS: &[(&str, &str)] = &[
    ("네온 사무라이", "neon samurai"),
    ("우주 고래", "space whale"),
    ("붉은 용", "red dragon"),
    ("푸른 숲", "blue forest"),
    ("고양이", "cat"),
    ("강아지", "puppy"),
    ("사무라이", "samurai"),
    ("로봇", "robot"),
    ("우주", "space"),
    ("숲", "forest"),
    ("바다", "ocean"),
    ("도시", "city"),
    ("거리", "street"),
    ("기사", "knight"),
    ("고래", "whale"),
    ("네온", "neon"),
    ("노을", "sunset"),
    ("밤", "night"),
    ("용", "dragon"),
];
