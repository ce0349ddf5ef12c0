use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{json, Map, Value};

use super::args::{self, Args};
use super::Helper;
use crate::commits::{action_content_to_commits, commit_type};
use crate::emoji;
use crate::format;
use crate::i18n::{plural_form_key_value, DEFAULT_LOCALE};
use crate::icons::{self, ActionType, EntryKind};
use crate::mirror::MirrorConfig;
use crate::render;
use crate::safe::{escape_html, SafeHtml, SafeJs};
use crate::state::RenderState;
use crate::strings;
use crate::svg::DEFAULT_ICON_SIZE;
use crate::timeutil;

/// Helpers also available to plain-text templates
const TEXT_HELPERS: &[&str] = &[
    "AppName",
    "AppSubUrl",
    "AppUrl",
    "AppVer",
    "AppBuiltWith",
    "AppDomain",
    "TimeSince",
    "TimeSinceUnix",
    "RawTimeSince",
    "DateFmtLong",
    "DateFmtShort",
    "List",
    "SubStr",
    "EllipsisString",
    "URLJoin",
    "Dict",
    "Printf",
    "Escape",
    "Sec2Time",
    "ParseDeadline",
    "dict",
    "percentage",
    "Add",
    "Mul",
    "Tr",
    "TrN",
];

pub(super) fn text_helpers(state: &RenderState) -> Vec<(&'static str, Helper)> {
    html_helpers(state)
        .into_iter()
        .filter(|(name, _)| TEXT_HELPERS.contains(name))
        .collect()
}

pub(super) fn html_helpers(state: &RenderState) -> Vec<(&'static str, Helper)> {
    let mut helpers = config_helpers(state);
    helpers.extend(format_helpers(state));
    helpers.extend(markup_helpers(state));
    helpers.extend(icon_helpers(state));
    helpers.extend(data_helpers());
    helpers
}

fn html(result: SafeHtml) -> Value {
    Value::String(result.into_string())
}

fn lang(func: &str, args: &Args) -> tera::Result<String> {
    let lang = args::string_or_empty(func, args, "lang")?;
    if lang.is_empty() {
        Ok(DEFAULT_LOCALE.to_string())
    } else {
        Ok(lang)
    }
}

/// Timestamp argument given as RFC 3339 text or unix seconds
fn time(func: &str, args: &Args, key: &str) -> tera::Result<DateTime<FixedOffset>> {
    match args::required(func, args, key)? {
        Value::String(s) => timeutil::parse_rfc3339(s)
            .ok_or_else(|| format!("{} expects an RFC 3339 timestamp for `{}`", func, key).into()),
        Value::Number(n) => n
            .as_i64()
            .map(|secs| DateTime::<FixedOffset>::from(timeutil::from_unix(secs)))
            .ok_or_else(|| format!("{} expects unix seconds for `{}`", func, key).into()),
        _ => Err(format!("{} expects a timestamp for `{}`", func, key).into()),
    }
}

fn config_helpers(state: &RenderState) -> Vec<(&'static str, Helper)> {
    let config = &state.config;
    let avatar_state = state.clone();
    vec![
        ("UseHTTPS", Helper::constant(json!(config.use_https()))),
        ("AppName", Helper::constant(json!(config.app_name))),
        ("AppSubUrl", Helper::constant(json!(config.app_sub_url))),
        ("StaticUrlPrefix", Helper::constant(json!(config.static_url_prefix))),
        ("AppUrl", Helper::constant(json!(config.app_url))),
        ("AppVer", Helper::constant(json!(config.app_version))),
        ("AppBuiltWith", Helper::constant(json!(config.app_built_with))),
        ("AppDomain", Helper::constant(json!(config.domain))),
        ("DisableGravatar", Helper::constant(json!(config.disable_gravatar))),
        ("DefaultShowFullName", Helper::constant(json!(config.default_show_full_name))),
        (
            "ShowFooterTemplateLoadTime",
            Helper::constant(json!(config.show_footer_template_load_time)),
        ),
        ("AllowedReactions", Helper::constant(json!(config.reactions))),
        ("ThemeColorMetaTag", Helper::constant(json!(config.theme_color_meta_tag))),
        ("MetaAuthor", Helper::constant(json!(config.meta_author))),
        ("MetaDescription", Helper::constant(json!(config.meta_description))),
        ("MetaKeywords", Helper::constant(json!(config.meta_keywords))),
        ("UseServiceWorker", Helper::constant(json!(config.use_service_worker))),
        ("DisableGitHooks", Helper::constant(json!(config.disable_git_hooks))),
        ("DisableWebhooks", Helper::constant(json!(config.disable_webhooks))),
        ("DisableImportLocal", Helper::constant(json!(!config.import_local_paths))),
        ("DisableSSH", Helper::constant(json!(config.ssh_disabled))),
        ("DisableOAuth2", Helper::constant(json!(!config.oauth2_enabled))),
        ("Disable2FA", Helper::constant(json!(config.disable_2fa))),
        ("DefaultTheme", Helper::constant(json!(config.default_theme))),
        (
            "NotificationSettings",
            Helper::constant(json!(config.notification_settings())),
        ),
        (
            "AvatarLink",
            Helper::plain(move |a| {
                let email = args::string_or_empty("AvatarLink", a, "email")?;
                Ok(json!(avatar_state.avatar_link(&email)))
            }),
        ),
    ]
}

fn format_helpers(state: &RenderState) -> Vec<(&'static str, Helper)> {
    let tr_since = state.translator.clone();
    let tr_since_unix = state.translator.clone();
    let tr_raw = state.translator.clone();

    let file_size = |a: &Args| -> tera::Result<Value> {
        Ok(json!(format::file_size(args::uint("FileSize", a, "size")?)))
    };

    vec![
        (
            "LoadTimes",
            Helper::plain(|a| {
                let start = time("LoadTimes", a, "start")?.with_timezone(&Utc);
                Ok(json!(timeutil::load_time(start, Utc::now())))
            }),
        ),
        (
            "TimeSince",
            Helper::html(move |a| {
                let then = time("TimeSince", a, "t")?.with_timezone(&Utc);
                let lang = lang("TimeSince", a)?;
                Ok(html(timeutil::html_time_since(then, Utc::now(), &lang, tr_since.as_ref())))
            }),
        ),
        (
            "TimeSinceUnix",
            Helper::html(move |a| {
                let then = timeutil::from_unix(args::int("TimeSinceUnix", a, "t")?);
                let lang = lang("TimeSinceUnix", a)?;
                Ok(html(timeutil::html_time_since(then, Utc::now(), &lang, tr_since_unix.as_ref())))
            }),
        ),
        (
            "RawTimeSince",
            Helper::plain(move |a| {
                let then = time("RawTimeSince", a, "t")?.with_timezone(&Utc);
                let lang = lang("RawTimeSince", a)?;
                Ok(json!(timeutil::time_since(then, Utc::now(), &lang, tr_raw.as_ref())))
            }),
        ),
        ("FileSize", Helper::plain(file_size)),
        ("SizeFmt", Helper::plain(file_size)),
        (
            "PrettyNumber",
            Helper::plain(|a| Ok(json!(format::pretty_number(args::int("PrettyNumber", a, "n")?)))),
        ),
        (
            "CountFmt",
            Helper::plain(|a| Ok(json!(format::format_number_si(args::int("CountFmt", a, "n")?)))),
        ),
        (
            "Subtract",
            Helper::plain(|a| {
                let left = args::required("Subtract", a, "left")?;
                let right = args::required("Subtract", a, "right")?;
                format::subtract(left, right)
                    .ok_or_else(|| "Subtract expects two numbers".into())
            }),
        ),
        (
            "Add",
            Helper::plain(|a| Ok(json!(format::add(&args::int_list("Add", a, "values")?)))),
        ),
        (
            "Mul",
            Helper::plain(|a| Ok(json!(format::mul(&args::int_list("Mul", a, "values")?)))),
        ),
        (
            "percentage",
            Helper::plain(|a| {
                let n = args::int("percentage", a, "n")?;
                let values = args::int_list("percentage", a, "values")?;
                Ok(json!(format::percentage(n, &values)))
            }),
        ),
        (
            "DateFmtLong",
            Helper::plain(|a| Ok(json!(timeutil::date_fmt_long(&time("DateFmtLong", a, "t")?)))),
        ),
        (
            "DateFmtShort",
            Helper::plain(|a| Ok(json!(timeutil::date_fmt_short(&time("DateFmtShort", a, "t")?)))),
        ),
        (
            "Sec2Time",
            Helper::plain(|a| Ok(json!(timeutil::sec_to_time(args::int("Sec2Time", a, "seconds")?)))),
        ),
        (
            "Json",
            Helper::plain(|a| Ok(json!(format::json_or_empty(args::required("Json", a, "value")?)))),
        ),
        (
            "JsonPrettyPrint",
            Helper::plain(|a| {
                Ok(json!(format::json_pretty_print(&args::string("JsonPrettyPrint", a, "json")?)))
            }),
        ),
        (
            "SubStr",
            Helper::plain(|a| {
                let s = args::string("SubStr", a, "str")?;
                let start = args::int_or("SubStr", a, "start", 0)?;
                let length = args::int_or("SubStr", a, "length", -1)?;
                Ok(json!(strings::substr(&s, start, length)))
            }),
        ),
        (
            "EllipsisString",
            Helper::plain(|a| {
                let s = args::string("EllipsisString", a, "str")?;
                let length = args::uint("EllipsisString", a, "length")?;
                Ok(json!(strings::ellipsis_string(&s, length as usize)))
            }),
        ),
        (
            "ShortSha",
            Helper::plain(|a| Ok(json!(strings::short_sha(&args::string("ShortSha", a, "sha")?)))),
        ),
        (
            "Sha1",
            Helper::plain(|a| Ok(json!(strings::sha1_hex(&args::string("Sha1", a, "str")?)))),
        ),
        (
            "MD5",
            Helper::plain(|a| Ok(json!(strings::md5_hex(&args::string("MD5", a, "str")?)))),
        ),
        (
            "PathEscape",
            Helper::plain(|a| Ok(json!(strings::path_escape(&args::string("PathEscape", a, "str")?)))),
        ),
        (
            "PathEscapeSegments",
            Helper::plain(|a| {
                Ok(json!(strings::path_escape_segments(&args::string(
                    "PathEscapeSegments",
                    a,
                    "path"
                )?)))
            }),
        ),
        (
            "EscapePound",
            Helper::plain(|a| Ok(json!(strings::escape_pound(&args::string("EscapePound", a, "str")?)))),
        ),
        (
            "URLJoin",
            Helper::plain(|a| {
                let base = args::string("URLJoin", a, "base")?;
                let elems: Vec<String> = args::array_or_empty("URLJoin", a, "elems")?
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                let elems: Vec<&str> = elems.iter().map(String::as_str).collect();
                Ok(json!(strings::url_join(&base, &elems)))
            }),
        ),
        (
            "SubJumpablePath",
            Helper::plain(|a| {
                Ok(json!(strings::sub_jumpable_path(&args::string("SubJumpablePath", a, "path")?)))
            }),
        ),
        (
            "ParseDeadline",
            Helper::plain(|a| {
                Ok(json!(strings::parse_deadline(&args::string("ParseDeadline", a, "deadline")?)))
            }),
        ),
        (
            "FilenameIsImage",
            Helper::plain(|a| {
                Ok(json!(strings::filename_is_image(&args::string("FilenameIsImage", a, "filename")?)))
            }),
        ),
        (
            "TabSizeClass",
            Helper::plain(|a| {
                let filename = args::string("TabSizeClass", a, "filename")?;
                let editorconfig = args::string_or_empty("TabSizeClass", a, "editorconfig")?;
                let editorconfig = Some(editorconfig.as_str()).filter(|ec| !ec.is_empty());
                Ok(json!(strings::tab_size_class(editorconfig, &filename)))
            }),
        ),
        (
            "Printf",
            Helper::plain(|a| {
                let format = args::string("Printf", a, "format")?;
                let values = args::array_or_empty("Printf", a, "args")?;
                Ok(json!(strings::printf(&format, &values)))
            }),
        ),
        (
            "Escape",
            Helper::plain(|a| Ok(json!(escape_html(&args::string("Escape", a, "raw")?)))),
        ),
    ]
}

fn markup_helpers(state: &RenderState) -> Vec<(&'static str, Helper)> {
    let engine = state.markup.clone();
    let static_url_prefix = state.config.static_url_prefix.clone();

    let safe_engine = engine.clone();
    let str2html_engine = engine.clone();
    let message_engine = engine.clone();
    let link_engine = engine.clone();
    let subject_engine = engine.clone();
    let body_engine = engine.clone();
    let note_engine = engine.clone();
    let emoji_engine = engine;

    vec![
        (
            "Safe",
            Helper::html(move |a| {
                let raw = args::string("Safe", a, "raw")?;
                Ok(html(SafeHtml::sanitize(&raw, safe_engine.as_ref())))
            }),
        ),
        (
            "Str2html",
            Helper::html(move |a| {
                let raw = args::string("Str2html", a, "raw")?;
                Ok(html(SafeHtml::sanitize(&raw, str2html_engine.as_ref())))
            }),
        ),
        (
            "SafeJS",
            Helper::html(|a| {
                let value = args::required("SafeJS", a, "value")?;
                let js = SafeJs::json(value).map_err(|e| tera::Error::msg(format!("SafeJS: {}", e)))?;
                Ok(json!(js.as_str()))
            }),
        ),
        (
            "RenderCommitMessage",
            Helper::html(move |a| {
                let msg = args::string_or_empty("RenderCommitMessage", a, "msg")?;
                let prefix = args::string_or_empty("RenderCommitMessage", a, "url_prefix")?;
                let metas = args::string_map("RenderCommitMessage", a, "metas")?;
                Ok(html(render::render_commit_message(
                    message_engine.as_ref(),
                    &msg,
                    &prefix,
                    &metas,
                )))
            }),
        ),
        (
            "RenderCommitMessageLink",
            Helper::html(move |a| {
                let msg = args::string_or_empty("RenderCommitMessageLink", a, "msg")?;
                let prefix = args::string_or_empty("RenderCommitMessageLink", a, "url_prefix")?;
                let default = args::string_or_empty("RenderCommitMessageLink", a, "url_default")?;
                let metas = args::string_map("RenderCommitMessageLink", a, "metas")?;
                Ok(html(render::render_commit_message_link(
                    link_engine.as_ref(),
                    &msg,
                    &prefix,
                    &default,
                    &metas,
                )))
            }),
        ),
        (
            "RenderCommitMessageLinkSubject",
            Helper::html(move |a| {
                let func = "RenderCommitMessageLinkSubject";
                let msg = args::string_or_empty(func, a, "msg")?;
                let prefix = args::string_or_empty(func, a, "url_prefix")?;
                let default = args::string_or_empty(func, a, "url_default")?;
                let metas = args::string_map(func, a, "metas")?;
                Ok(html(render::render_commit_message_link_subject(
                    subject_engine.as_ref(),
                    &msg,
                    &prefix,
                    &default,
                    &metas,
                )))
            }),
        ),
        (
            "RenderCommitBody",
            Helper::html(move |a| {
                let msg = args::string_or_empty("RenderCommitBody", a, "msg")?;
                let prefix = args::string_or_empty("RenderCommitBody", a, "url_prefix")?;
                let metas = args::string_map("RenderCommitBody", a, "metas")?;
                Ok(html(render::render_commit_body(body_engine.as_ref(), &msg, &prefix, &metas)))
            }),
        ),
        (
            "RenderNote",
            Helper::html(move |a| {
                let msg = args::string_or_empty("RenderNote", a, "msg")?;
                let prefix = args::string_or_empty("RenderNote", a, "url_prefix")?;
                let metas = args::string_map("RenderNote", a, "metas")?;
                Ok(html(render::render_note(note_engine.as_ref(), &msg, &prefix, &metas)))
            }),
        ),
        (
            "RenderEmoji",
            Helper::html(move |a| {
                let text = args::string_or_empty("RenderEmoji", a, "text")?;
                Ok(html(render::render_emoji(emoji_engine.as_ref(), &text)))
            }),
        ),
        (
            "RenderEmojiPlain",
            Helper::plain(|a| {
                let text = args::string_or_empty("RenderEmojiPlain", a, "text")?;
                Ok(json!(emoji::replace_aliases(&text)))
            }),
        ),
        (
            "ReactionToEmoji",
            Helper::html(move |a| {
                let reaction = args::string("ReactionToEmoji", a, "reaction")?;
                Ok(html(emoji::reaction_to_emoji(&reaction, &static_url_prefix)))
            }),
        ),
        (
            "IsMultilineCommitMessage",
            Helper::plain(|a| {
                let msg = args::string_or_empty("IsMultilineCommitMessage", a, "msg")?;
                Ok(json!(render::is_multiline_commit_message(&msg)))
            }),
        ),
    ]
}

fn icon_helpers(state: &RenderState) -> Vec<(&'static str, Helper)> {
    let svg_table = state.svg.clone();
    let arrow_table = state.svg.clone();
    let translator = state.translator.clone();

    vec![
        (
            "ActionIcon",
            Helper::plain(|a| {
                let icon = match args::required("ActionIcon", a, "op_type")? {
                    Value::Number(n) => icons::action_icon_for_code(n.as_i64().unwrap_or_default()),
                    other => serde_json::from_value::<ActionType>(other.clone())
                        .map(icons::action_icon)
                        .unwrap_or(icons::DEFAULT_ACTION_ICON),
                };
                Ok(json!(icon))
            }),
        ),
        (
            "MigrationIcon",
            Helper::plain(|a| {
                let hostname = args::string_or_empty("MigrationIcon", a, "hostname")?;
                Ok(json!(icons::migration_icon(&hostname)))
            }),
        ),
        (
            "EntryIcon",
            Helper::plain(|a| {
                let entry = args::required("EntryIcon", a, "entry")?;
                let kind: EntryKind = serde_json::from_value(entry.clone())
                    .map_err(|e| tera::Error::msg(format!("EntryIcon: {}", e)))?;
                Ok(json!(icons::entry_icon(kind)))
            }),
        ),
        (
            "DiffTypeToStr",
            Helper::plain(|a| {
                Ok(json!(icons::diff_type_to_str(args::int("DiffTypeToStr", a, "diff_type")?)))
            }),
        ),
        (
            "DiffLineTypeToStr",
            Helper::plain(|a| {
                Ok(json!(icons::diff_line_type_to_str(args::int(
                    "DiffLineTypeToStr",
                    a,
                    "diff_type"
                )?)))
            }),
        ),
        (
            "svg",
            Helper::html(move |a| {
                let icon = args::string("svg", a, "icon")?;
                let size = args::int_or("svg", a, "size", i64::from(DEFAULT_ICON_SIZE))?;
                let class = args::string_or_empty("svg", a, "class")?;
                let size = u32::try_from(size).unwrap_or(DEFAULT_ICON_SIZE);
                Ok(html(svg_table.render(&icon, size, &class)))
            }),
        ),
        (
            "SortArrow",
            Helper::html(move |a| {
                let norm = args::string_or_empty("SortArrow", a, "norm_sort")?;
                let rev = args::string_or_empty("SortArrow", a, "rev_sort")?;
                let url = args::string_or_empty("SortArrow", a, "url_sort")?;
                Ok(html(arrow_table.sort_arrow(&norm, &rev, &url)))
            }),
        ),
        (
            "Tr",
            Helper::plain(move |a| {
                let lang = lang("Tr", a)?;
                let key = args::string("Tr", a, "key")?;
                let values: Vec<String> = args::array_or_empty("Tr", a, "args")?
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                Ok(json!(translator.tr(&lang, &key, &values)))
            }),
        ),
        (
            "TrN",
            Helper::plain(|a| {
                let lang = lang("TrN", a)?;
                let count = args::required("TrN", a, "count")?;
                let key_one = args::string("TrN", a, "key_one")?;
                let key_n = args::string("TrN", a, "key_n")?;
                Ok(json!(plural_form_key_value(&lang, count, &key_one, &key_n)))
            }),
        ),
    ]
}

/// Build a map from alternating key / value entries
fn dict_from_pairs(values: &[Value]) -> Result<Map<String, Value>, &'static str> {
    if values.len() % 2 != 0 {
        return Err("invalid dict call");
    }
    values
        .chunks(2)
        .map(|pair| match &pair[0] {
            Value::String(key) => Ok((key.clone(), pair[1].clone())),
            _ => Err("dict keys must be strings"),
        })
        .collect()
}

/// Build a map from `key, value` runs and whole maps merged in order
fn dict_merge(values: &[Value]) -> Result<Map<String, Value>, &'static str> {
    if values.is_empty() {
        return Err("invalid dict call");
    }
    let mut dict = Map::new();
    let mut iter = values.iter();
    while let Some(value) = iter.next() {
        match value {
            Value::String(key) => {
                let value = iter.next().ok_or("specify the key for non array values")?;
                dict.insert(key.clone(), value.clone());
            }
            Value::Object(map) => {
                for (k, v) in map {
                    dict.insert(k.clone(), v.clone());
                }
            }
            _ => return Err("dict values must be maps"),
        }
    }
    Ok(dict)
}

fn mirror(func: &str, args: &Args) -> tera::Result<MirrorConfig> {
    match args::required(func, args, "mirror")? {
        Value::String(address) => Ok(MirrorConfig::new(address.clone())),
        other => serde_json::from_value(other.clone())
            .map_err(|e| tera::Error::msg(format!("{}: {}", func, e))),
    }
}

fn data_helpers() -> Vec<(&'static str, Helper)> {
    vec![
        (
            "Dict",
            Helper::plain(|a| {
                let values = args::array("Dict", a, "values")?;
                dict_from_pairs(values).map(Value::Object).map_err(Into::into)
            }),
        ),
        (
            "dict",
            Helper::plain(|a| {
                let values = args::array("dict", a, "values")?;
                dict_merge(values).map(Value::Object).map_err(Into::into)
            }),
        ),
        (
            "List",
            Helper::plain(|a| Ok(Value::Array(args::array_or_empty("List", a, "items")?))),
        ),
        (
            "contain",
            Helper::plain(|a| {
                let list = args::int_list("contain", a, "list")?;
                let id = args::int("contain", a, "id")?;
                Ok(json!(list.contains(&id)))
            }),
        ),
        (
            "ActionContent2Commits",
            Helper::plain(|a| {
                let content = args::string_or_empty("ActionContent2Commits", a, "content")?;
                Ok(json!(action_content_to_commits(&content)))
            }),
        ),
        (
            "CommitType",
            Helper::plain(|a| Ok(json!(commit_type(args::required("CommitType", a, "commit")?)))),
        ),
        (
            "MirrorAddress",
            Helper::plain(|a| Ok(json!(mirror("MirrorAddress", a)?.address()))),
        ),
        (
            "MirrorFullAddress",
            Helper::plain(|a| Ok(json!(mirror("MirrorFullAddress", a)?.full_address()))),
        ),
        (
            "MirrorUserName",
            Helper::plain(|a| Ok(json!(mirror("MirrorUserName", a)?.username()))),
        ),
        (
            "MirrorPassword",
            Helper::plain(|a| Ok(json!(mirror("MirrorPassword", a)?.password()))),
        ),
    ]
}
