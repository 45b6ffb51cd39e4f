//! Category vocabularies and stop-words for rule-based classification.

use readlater_shared::Category;

/// Terms that vote for `category`. Multi-word entries match consecutive tokens.
pub(crate) fn terms(category: Category) -> &'static [&'static str] {
    match category {
        Category::Technology => &[
            "software", "hardware", "computer", "programming", "code", "developer", "app",
            "application", "digital", "tech", "internet", "web", "api", "algorithm", "data",
            "database", "cloud", "server", "network", "cybersecurity", "security", "encryption",
            "blockchain", "cryptocurrency", "artificial intelligence", "machine learning", "ai",
            "robot", "automation", "runtime", "compiler", "open source",
        ],
        Category::Science => &[
            "research", "study", "scientist", "scientific", "experiment", "theory", "biology",
            "chemistry", "physics", "astronomy", "space", "universe", "climate", "environment",
            "ecology", "genetics", "dna", "laboratory", "discovery", "telescope", "planet",
            "species",
        ],
        Category::Business => &[
            "business", "company", "startup", "entrepreneur", "ceo", "market", "economy",
            "finance", "investment", "investor", "stock", "trade", "revenue", "profit", "sales",
            "customer", "marketing", "strategy", "management", "corporate", "enterprise",
            "industry", "commerce", "brand",
        ],
        Category::Health => &[
            "health", "medical", "disease", "vaccine", "medicine", "doctor", "patient",
            "hospital", "clinical", "nutrition", "diet", "symptom", "therapy", "treatment",
            "mental health", "sleep", "wellness", "stretch", "exercise",
        ],
        Category::Politics => &[
            "government", "politics", "political", "election", "vote", "democracy", "president",
            "minister", "congress", "parliament", "law", "policy", "legislation", "candidate",
            "campaign", "senator", "representative", "diplomacy", "international", "nation",
            "federal",
        ],
        Category::Entertainment => &[
            "movie", "film", "actor", "actress", "director", "cinema", "television", "show",
            "series", "music", "song", "album", "concert", "band", "artist", "entertainment",
            "celebrity", "hollywood", "streaming", "gaming", "video game", "esports",
        ],
        Category::Sports => &[
            "sport", "athlete", "team", "player", "coach", "game", "match",
            "tournament", "championship", "league", "football", "soccer", "basketball",
            "baseball", "tennis", "golf", "olympic", "competition", "fitness",
        ],
        Category::Education => &[
            "education", "learning", "student", "teacher", "school", "university", "college",
            "course", "lesson", "academic", "degree", "curriculum", "classroom", "lecture",
            "tutorial", "training", "knowledge", "skill", "pedagogy",
        ],
        Category::Lifestyle => &[
            "lifestyle", "fashion", "style", "design", "home", "food", "recipe", "cooking",
            "travel", "vacation", "destination", "hotel", "restaurant", "beauty", "hobby",
            "craft", "diy", "garden",
        ],
        Category::General => &[],
    }
}

/// Words that never become keywords.
pub(crate) const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "also", "although", "and", "any",
    "are", "around", "because", "been", "before", "being", "below", "between", "both", "but",
    "can", "cannot", "could", "did", "does", "doing", "down", "during", "each", "either",
    "else", "even", "ever", "every", "few", "for", "from", "further", "get", "gets", "got",
    "had", "has", "have", "having", "her", "here", "hers", "herself", "him", "himself", "his",
    "how", "however", "into", "its", "itself", "just", "less", "let", "like", "made", "make",
    "makes", "many", "may", "might", "more", "most", "much", "must", "myself", "never", "new",
    "nor", "not", "now", "off", "once", "one", "only", "other", "our", "ours", "ourselves",
    "out", "over", "own", "per", "rather", "really", "said", "same", "say", "says", "see",
    "she", "should", "since", "some", "still", "such", "take", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "thing", "things",
    "this", "those", "though", "through", "too", "two", "under", "until", "upon", "use",
    "used", "using", "very", "was", "way", "well", "were", "what", "when", "where", "whether",
    "which", "while", "who", "whom", "whose", "why", "will", "with", "within", "without",
    "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];
