use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::safe::{escape_html, SafeHtml};

/// A single emoji with its shortcode aliases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
    pub emoji: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
}

const EMOJIS: &[Emoji] = &[
    Emoji { emoji: "👍", description: "thumbs up", aliases: &["+1", "thumbsup"] },
    Emoji { emoji: "👎", description: "thumbs down", aliases: &["-1", "thumbsdown"] },
    Emoji { emoji: "😆", description: "grinning squinting face", aliases: &["laughing", "laugh", "satisfied"] },
    Emoji { emoji: "🎉", description: "party popper", aliases: &["tada", "hooray"] },
    Emoji { emoji: "😕", description: "confused face", aliases: &["confused"] },
    Emoji { emoji: "❤️", description: "red heart", aliases: &["heart"] },
    Emoji { emoji: "🚀", description: "rocket", aliases: &["rocket"] },
    Emoji { emoji: "👀", description: "eyes", aliases: &["eyes"] },
    Emoji { emoji: "😄", description: "grinning face with smiling eyes", aliases: &["smile"] },
    Emoji { emoji: "😃", description: "grinning face with big eyes", aliases: &["smiley"] },
    Emoji { emoji: "😀", description: "grinning face", aliases: &["grinning"] },
    Emoji { emoji: "😉", description: "winking face", aliases: &["wink"] },
    Emoji { emoji: "😂", description: "face with tears of joy", aliases: &["joy"] },
    Emoji { emoji: "😢", description: "crying face", aliases: &["cry"] },
    Emoji { emoji: "🤔", description: "thinking face", aliases: &["thinking"] },
    Emoji { emoji: "👋", description: "waving hand", aliases: &["wave"] },
    Emoji { emoji: "🔥", description: "fire", aliases: &["fire"] },
    Emoji { emoji: "🐛", description: "bug", aliases: &["bug"] },
    Emoji { emoji: "✨", description: "sparkles", aliases: &["sparkles"] },
    Emoji { emoji: "⚡", description: "high voltage", aliases: &["zap"] },
    Emoji { emoji: "⭐", description: "star", aliases: &["star"] },
    Emoji { emoji: "⚠️", description: "warning", aliases: &["warning"] },
    Emoji { emoji: "✅", description: "check mark button", aliases: &["white_check_mark"] },
    Emoji { emoji: "❌", description: "cross mark", aliases: &["x"] },
    Emoji { emoji: "📝", description: "memo", aliases: &["memo", "pencil"] },
    Emoji { emoji: "🔒", description: "locked", aliases: &["lock"] },
    Emoji { emoji: "🎨", description: "artist palette", aliases: &["art"] },
    Emoji { emoji: "🚧", description: "construction", aliases: &["construction"] },
    Emoji { emoji: "♻️", description: "recycling symbol", aliases: &["recycle"] },
    Emoji { emoji: "🍵", description: "teacup without handle", aliases: &["tea"] },
];

struct EmojiIndex {
    by_code: HashMap<&'static str, usize>,
    by_alias: HashMap<&'static str, usize>,
}

fn index() -> &'static EmojiIndex {
    static INDEX: OnceLock<EmojiIndex> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut by_code = HashMap::new();
        let mut by_alias = HashMap::new();
        for (i, e) in EMOJIS.iter().enumerate() {
            by_code.insert(e.emoji, i);
            for alias in e.aliases {
                by_alias.insert(*alias, i);
            }
        }
        EmojiIndex { by_code, by_alias }
    })
}

fn alias_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":([\w+\-]+):").expect("valid emoji alias pattern"))
}

/// Look up an emoji by its character
pub fn from_code(code: &str) -> Option<&'static Emoji> {
    index().by_code.get(code).map(|&i| &EMOJIS[i])
}

/// Look up an emoji by shortcode, with or without surrounding colons
pub fn from_alias(alias: &str) -> Option<&'static Emoji> {
    let alias = alias.trim_start_matches(':').trim_end_matches(':');
    index().by_alias.get(alias).map(|&i| &EMOJIS[i])
}

/// Replace every known `:alias:` with its emoji character
pub fn replace_aliases(text: &str) -> String {
    alias_pattern()
        .replace_all(text, |caps: &Captures| match from_alias(&caps[1]) {
            Some(e) => e.emoji.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Replace every known `:alias:` with an accessible emoji span
pub fn replace_aliases_html(escaped: &str) -> String {
    alias_pattern()
        .replace_all(escaped, |caps: &Captures| match from_alias(&caps[1]) {
            Some(e) => emoji_span(e),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn emoji_span(e: &Emoji) -> String {
    format!(
        r#"<span class="emoji" aria-label="{}">{}</span>"#,
        e.description, e.emoji
    )
}

/// Emoji markup for a reaction, falling back to a custom image under the static prefix
pub fn reaction_to_emoji(reaction: &str, static_url_prefix: &str) -> SafeHtml {
    if let Some(e) = from_code(reaction).or_else(|| from_alias(reaction)) {
        return SafeHtml::trusted(e.emoji.to_string());
    }
    let name = escape_html(reaction);
    SafeHtml::trusted(format!(
        r#"<img alt=":{name}:" src="{prefix}/img/emoji/{name}.png"></img>"#,
        name = name,
        prefix = escape_html(static_url_prefix)
    ))
}
