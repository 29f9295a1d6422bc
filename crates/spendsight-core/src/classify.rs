//! Keyword classifiers for recurrence and necessity
//!
//! Recurrence (Subscription / Recurring / One-time) is assigned to every
//! transaction on ingest. Necessity (Needs / Wants / Savings) is only ever
//! *suggested*: ingest leaves it `Unknown` so the user tags it by hand, and
//! [`apply_suggested_necessity`] refuses to overwrite an existing tag.

use tracing::debug;

use crate::keywords::contains_any;
use crate::models::{NecessityLevel, RecurrenceType, Transaction};

/// Known subscription services
const SUBSCRIPTION_KEYWORDS: &[&str] = &[
    // Streaming & entertainment
    "netflix", "hulu", "disney+", "disney plus", "hbo max", "hbo", "paramount+",
    "peacock", "apple tv", "amazon prime", "prime video", "spotify", "apple music",
    "youtube premium", "youtube music", "pandora", "tidal", "deezer", "audible",
    "kindle unlimited", "crunchyroll", "funimation", "espn+", "sling", "fubo",
    // Software & productivity
    "microsoft 365", "office 365", "adobe", "creative cloud", "dropbox",
    "google one", "icloud", "evernote", "notion", "slack", "zoom", "canva",
    "grammarly", "lastpass", "1password", "dashlane", "nordvpn", "expressvpn",
    "surfshark", "github", "gitlab", "jetbrains", "figma", "sketch",
    // Gaming
    "xbox game pass", "playstation plus", "ps plus", "playstation network", "psn",
    "nintendo online", "ea play", "ubisoft+", "xbox live", "steam",
    // News & education
    "new york times", "washington post", "wall street journal", "wsj",
    "the athletic", "medium", "substack", "masterclass", "skillshare",
    "coursera", "udemy", "linkedin learning", "duolingo",
    // Fitness & health
    "planet fitness", "la fitness", "equinox", "orangetheory", "peloton",
    "fitbit premium", "headspace", "calm", "noom", "weight watchers", "ww",
    "myfitnesspal", "strava",
    // Delivery & food
    "doordash dashpass", "uber one", "uber eats pass", "grubhub+",
    "instacart express", "amazon fresh", "hellofresh", "blue apron",
    "factor", "freshly", "sunbasket",
    // Shopping & memberships
    "costco membership", "sam's club", "bj's", "walmart+", "target circle", "shipt",
    // Other services
    "patreon", "onlyfans", "twitch", "discord nitro",
];

/// Fixed bills that recur but are not discretionary subscriptions
const RECURRING_KEYWORDS: &[&str] = &[
    // Housing
    "rent", "mortgage", "hoa", "property tax", "home insurance",
    "renters insurance", "homeowners",
    // Loans
    "loan payment", "student loan", "auto loan", "car payment",
    "navient", "nelnet", "great lakes", "fedloan", "sallie mae",
    // Insurance
    "insurance", "geico", "progressive", "state farm", "allstate",
    "liberty mutual", "usaa", "nationwide", "farmers",
    "health insurance", "dental", "vision",
    // Utilities
    "electric", "gas bill", "water bill", "sewer", "trash",
    "internet", "comcast", "xfinity", "spectrum", "att", "verizon",
    "t-mobile", "sprint", "cricket",
    // Childcare
    "daycare", "childcare", "tuition",
];

/// Bank categories (lowercased, exact) that count as needs
const ESSENTIAL_CATEGORIES: &[&str] = &[
    "groceries", "supermarkets", "grocery",
    "utilities", "bills & utilities",
    "healthcare", "medical", "pharmacy", "health",
    "transportation", "gas", "gas & fuel", "auto & transport",
    "housing", "rent", "mortgage",
    "insurance",
    "childcare", "education",
];

const ESSENTIAL_KEYWORDS: &[&str] = &[
    // Food essentials
    "grocery", "supermarket", "whole foods", "trader joe", "safeway",
    "kroger", "publix", "aldi", "lidl", "food lion", "wegmans",
    "harris teeter", "stop & shop", "giant", "shoprite", "meijer",
    "heb", "costco", "sam's club", "bj's", "walmart grocery",
    // Utilities
    "electric", "gas bill", "water", "sewer", "trash", "utilities",
    // Healthcare
    "pharmacy", "cvs", "walgreens", "rite aid", "hospital", "medical",
    "doctor", "urgent care", "dentist", "optometrist", "prescription",
    // Transportation
    "gas station", "shell", "exxon", "chevron", "bp", "mobil",
    "metro", "subway", "bus", "transit", "uber", "lyft",
    // Housing
    "rent", "mortgage", "property tax",
    // Insurance
    "insurance",
    // Childcare
    "daycare", "childcare", "school", "tuition",
];

/// Bank categories (lowercased, exact) that count as wants
const DISCRETIONARY_CATEGORIES: &[&str] = &[
    "entertainment", "food & dining", "restaurants", "shopping",
    "travel", "travel/ entertainment", "merchandise",
    "personal care", "gifts", "hobbies",
];

const DISCRETIONARY_KEYWORDS: &[&str] = &[
    // Dining out
    "restaurant", "cafe", "coffee", "starbucks", "dunkin", "mcdonald",
    "burger", "pizza", "chipotle", "taco bell", "wendy's", "chick-fil-a",
    "panera", "subway", "jimmy john", "panda express", "olive garden",
    "applebee", "chili's", "buffalo wild", "ihop", "denny's",
    "doordash", "uber eats", "grubhub", "postmates", "seamless",
    // Entertainment
    "movie", "theater", "cinema", "amc", "regal", "concert", "ticket",
    "ticketmaster", "stubhub", "live nation", "bowling", "arcade",
    "dave & buster", "topgolf", "escape room", "museum", "zoo",
    // Shopping
    "amazon", "target", "walmart", "best buy", "apple store",
    "nordstrom", "macy's", "bloomingdale", "saks", "neiman marcus",
    "tj maxx", "marshalls", "ross", "home depot", "lowe's", "ikea",
    "wayfair", "etsy", "ebay", "wish", "shein", "zara", "h&m",
    "gap", "old navy", "banana republic", "j.crew", "uniqlo",
    // Personal care & beauty
    "salon", "spa", "massage", "nail", "barber", "haircut",
    "sephora", "ulta", "bath & body",
    // Hobbies
    "hobby lobby", "michaels", "joann", "guitar center",
    "dick's sporting", "rei", "bass pro", "cabela",
    // Leisure travel
    "hotel", "airbnb", "vrbo", "expedia", "booking.com", "kayak",
    "airline", "delta", "united", "american airlines", "southwest",
    "jetblue", "spirit", "frontier",
];

const SAVINGS_KEYWORDS: &[&str] = &[
    // Investments
    "vanguard", "fidelity", "schwab", "td ameritrade", "e*trade",
    "robinhood", "webull", "betterment", "wealthfront", "acorns",
    "stash", "m1 finance", "sofi invest",
    // Retirement
    "401k", "ira", "roth", "retirement", "pension",
    // Savings
    "savings transfer", "emergency fund", "high yield savings",
    "marcus", "ally", "discover savings", "capital one savings",
    // Crypto
    "coinbase", "binance", "kraken", "gemini", "crypto.com",
];

/// Decide whether a transaction is a subscription, a recurring bill or a
/// one-off purchase.
///
/// Subscription keywords are checked before recurring ones, so a description
/// matching both is a subscription. The amount does not currently influence
/// the outcome.
pub fn classify_recurrence(description: &str, _amount: f64) -> RecurrenceType {
    let desc = description.to_lowercase();

    if contains_any(&desc, SUBSCRIPTION_KEYWORDS) {
        return RecurrenceType::Subscription;
    }

    if contains_any(&desc, RECURRING_KEYWORDS) {
        return RecurrenceType::Recurring;
    }

    RecurrenceType::OneTime
}

/// Suggest a 50/30/20 bucket from description and bank category.
///
/// Priority: savings keywords > essential category > essential keywords >
/// discretionary category > discretionary keywords > Unknown.
pub fn classify_necessity(description: &str, category: &str) -> NecessityLevel {
    let desc = description.to_lowercase();
    let cat = category.trim().to_lowercase();

    if contains_any(&desc, SAVINGS_KEYWORDS) {
        return NecessityLevel::Savings;
    }

    if ESSENTIAL_CATEGORIES.contains(&cat.as_str()) {
        return NecessityLevel::Needs;
    }

    if contains_any(&desc, ESSENTIAL_KEYWORDS) {
        return NecessityLevel::Needs;
    }

    if DISCRETIONARY_CATEGORIES.contains(&cat.as_str()) {
        return NecessityLevel::Wants;
    }

    if contains_any(&desc, DISCRETIONARY_KEYWORDS) {
        return NecessityLevel::Wants;
    }

    NecessityLevel::Unknown
}

/// Ingest classification: set recurrence, reset necessity to Unknown.
///
/// Income is never a need, want or saving, so it also ends up Unknown.
pub fn classify(transaction: &mut Transaction) {
    transaction.recurrence = classify_recurrence(&transaction.description, transaction.amount);
    transaction.necessity = NecessityLevel::Unknown;
}

/// Classify every transaction in place
pub fn classify_batch(transactions: &mut [Transaction]) {
    for tx in transactions.iter_mut() {
        classify(tx);
    }
    debug!("Classified {} transactions", transactions.len());
}

/// Necessity the keyword tables would pick, without touching the transaction
pub fn suggest_necessity(transaction: &Transaction) -> NecessityLevel {
    if !transaction.is_expense() {
        return NecessityLevel::Unknown;
    }
    classify_necessity(&transaction.description, &transaction.category)
}

/// Fill in a suggested necessity for an untagged expense.
///
/// Returns true if the transaction changed. A necessity the user already
/// set is left alone.
pub fn apply_suggested_necessity(transaction: &mut Transaction) -> bool {
    if transaction.necessity != NecessityLevel::Unknown {
        return false;
    }
    let suggestion = suggest_necessity(transaction);
    if suggestion == NecessityLevel::Unknown {
        return false;
    }
    transaction.necessity = suggestion;
    true
}
