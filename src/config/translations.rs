//! Static lookup tables for upstream display names and error codes.
//!
//! The upstream API reports hero and weapon names in Chinese. The dashboard
//! shows English labels, so names are translated before they become part of a
//! stat row id. Unknown names pass through unchanged.

use std::collections::HashMap;
use std::sync::LazyLock;

static HERO_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("魏轻", "Wei Qing"),
        ("刘炼", "Liu Lian"),
        ("蓝梦", "Lan Meng"),
        ("顾清寒", "Gu Qinghan"),
        ("特木尔", "Temur"),
        ("席拉", "Xila"),
        ("胡为", "Hu Wei"),
        ("张起灵", "Zhang Qiling"),
        ("玉玲珑", "Yu Linglong"),
        ("殷紫萍", "Yin Ziping"),
        ("迦南", "Canaan"),
        ("崔三娘", "Cui Sanniang"),
    ])
});

static WEAPON_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("太刀", "Katana"),
        ("匕首", "Dagger"),
        ("长枪", "Spear"),
        ("大刀", "Greatsword"),
        ("长剑", "Longsword"),
        ("双刀", "Dual Blades"),
        ("弓", "Bow"),
        ("铁扇", "Iron Fan"),
        ("长鞭", "Whip"),
        ("短刀", "Short Sword"),
    ])
});

static ERROR_CODES: LazyLock<HashMap<i64, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (20000, "Server error"),
        (20001, "Request failed"),
        (20002, "Invalid parameters"),
    ])
});

static ERROR_MESSAGES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("参数非法", "Invalid parameters"),
        ("成功", "Success"),
        ("失败", "Failed"),
    ])
});

pub fn translate_hero_name(name: &str) -> String {
    HERO_NAMES.get(name).copied().unwrap_or(name).to_string()
}

pub fn translate_weapon_name(name: &str) -> String {
    WEAPON_NAMES.get(name).copied().unwrap_or(name).to_string()
}

/// Known codes win over the message; otherwise the message is translated
/// when possible and passed through verbatim when not.
pub fn translate_error(code: i64, message: &str) -> String {
    if let Some(known) = ERROR_CODES.get(&code) {
        return (*known).to_string();
    }

    ERROR_MESSAGES
        .get(message)
        .copied()
        .unwrap_or(message)
        .to_string()
}
