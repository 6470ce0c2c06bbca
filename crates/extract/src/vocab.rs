//! Region vocabulary: canonical places, aliases, and keyword tables.
//!
//! Tier 1 is the closed set of canonical place identifiers for the served
//! region; tier 2 maps common landmarks, abbreviations, and English names
//! onto them. Alias matching is case-insensitive for Latin script.

use tw_domain::extracted::ActivityClass;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Locations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Canonical place names plus the aliases that resolve to them.
///
/// The canonical name itself also matches. Longer aliases are matched before
/// shorter ones so "南京路步行街" wins over "南京路".
pub const LOCATIONS: &[(&str, &[&str])] = &[
    ("外滩", &["the bund", "waitan", "bund"]),
    (
        "东方明珠",
        &["东方明珠塔", "明珠塔", "电视塔", "oriental pearl"],
    ),
    (
        "上海迪士尼乐园",
        &["迪士尼", "迪斯尼", "迪斯尼乐园", "disneyland", "disney"],
    ),
    ("人民广场", &["people's square", "peoples square"]),
    (
        "南京路步行街",
        &["南京路", "南京东路", "步行街", "nanjing road"],
    ),
    ("豫园", &["城隍庙", "老城隍庙", "豫园商城", "yu garden", "yuyuan"]),
    (
        "陆家嘴",
        &[
            "浦东",
            "浦东新区",
            "金茂大厦",
            "金茂",
            "环球金融中心",
            "上海中心",
            "lujiazui",
            "pudong",
        ],
    ),
    ("徐家汇", &["xujiahui"]),
    ("田子坊", &["tianzifang"]),
    ("新天地", &["xintiandi"]),
    ("静安寺", &["jing'an temple", "jingan temple"]),
    ("虹桥", &["虹桥机场", "虹桥火车站", "hongqiao"]),
    ("朱家角古镇", &["朱家角", "zhujiajiao"]),
    ("七宝古镇", &["七宝", "七宝老街", "qibao"]),
    ("五角场", &["wujiaochang"]),
    ("上海博物馆", &["shanghai museum"]),
    ("上海科技馆", &["科技馆", "science and technology museum"]),
    ("武康路", &["wukang road"]),
];

/// Well-known landmark names that earn an extra keyword-priority boost.
pub const LANDMARKS: &[&str] = &[
    "东方明珠",
    "上海中心",
    "金茂大厦",
    "环球金融中心",
    "上海博物馆",
    "上海科技馆",
    "朱家角古镇",
    "七宝古镇",
    "武康路",
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Activities
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Keyword table feeding the closed activity-class set.
pub const ACTIVITIES: &[(ActivityClass, &[&str])] = &[
    (
        ActivityClass::Shopping,
        &["购物", "商场", "百货", "奥特莱斯", "专卖店", "shopping", "mall"],
    ),
    (
        ActivityClass::Cuisine,
        &[
            "美食", "餐厅", "小吃", "火锅", "烧烤", "料理", "吃", "food", "restaurant",
            "cuisine", "eat",
        ],
    ),
    (
        ActivityClass::Culture,
        &[
            "博物馆", "展览", "历史", "文化", "古迹", "艺术", "museum", "culture",
            "history", "art",
        ],
    ),
    (
        ActivityClass::Entertainment,
        &[
            "游乐", "娱乐", "电影", "酒吧", "夜生活", "ktv", "entertainment", "nightlife",
            "bar",
        ],
    ),
    (
        ActivityClass::Nature,
        &["公园", "花园", "湖", "江", "山", "自然", "park", "garden", "nature"],
    ),
    (
        ActivityClass::Business,
        &["会议", "商务", "办公", "business", "meeting"],
    ),
    (
        ActivityClass::Family,
        &["孩子", "儿童", "亲子", "带娃", "family-friendly", "kids"],
    ),
    (
        ActivityClass::Leisure,
        &["休闲", "放松", "漫步", "relax", "leisure", "stroll"],
    ),
    (
        ActivityClass::Sightseeing,
        &["景点", "观光", "游览", "打卡", "sightseeing", "attraction"],
    ),
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Keyword-priority word classes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generic terms that are never useful input-tips queries.
pub const GENERIC_WORDS: &[&str] = &[
    "天气", "交通", "景点", "餐厅", "上海", "旅游", "攻略", "购物", "美食", "文化",
    "娱乐", "自然", "商务", "亲子", "休闲", "观光", "weather", "traffic", "trip",
    "travel", "plan",
];

/// Relationship terms; people are not places.
pub const COMPANION_WORDS: &[&str] = &[
    "女朋友", "男朋友", "老婆", "老公", "父母", "孩子", "家人", "朋友", "闺蜜", "同事",
    "girlfriend", "boyfriend", "wife", "husband", "parents", "kids", "family",
    "friends", "colleagues",
];

/// Affect/preference terms; moods are not places either.
pub const PREFERENCE_WORDS: &[&str] = &[
    "避开人群", "不想远", "排队", "预算", "浪漫", "温馨", "安静", "热闹", "romantic",
    "cozy", "quiet", "budget",
];

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Candidate filtering
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Words a location-shaped pattern may capture that are clearly not places.
pub const NON_LOCATION_WORDS: &[&str] = &[
    "什么", "怎么", "如何", "好玩", "有趣", "推荐", "建议", "天气", "时候", "这里",
    "那里", "哪里",
];
