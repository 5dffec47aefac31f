//! Build configurations from token values and memory themes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ADVANCED_THRESHOLD, MAX_MEMORY_LIMIT, MAX_THREADS, PROFESSIONAL_THRESHOLD,
    QUANTUM_THRESHOLD,
};
use crate::time::now_iso8601;

/// Keyword sets per theme. A theme's count is the number of (line, keyword)
/// pairs where the lower-cased line contains the keyword.
pub const THEMES: [(&str, &[&str]); 4] = [
    (
        "nature",
        &["tree", "forest", "water", "river", "ocean", "cat", "animal"],
    ),
    ("people", &["man", "woman", "person", "child", "human"]),
    ("action", &["walk", "run", "move", "go", "come", "see"]),
    ("emotion", &["love", "hate", "fear", "joy", "sad", "happy"]),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTier {
    Basic,
    Professional,
    Advanced,
    Quantum,
}

impl BuildTier {
    /// Step function over value; every threshold is exclusive.
    pub fn for_value(value: f64) -> Self {
        if value > QUANTUM_THRESHOLD {
            BuildTier::Quantum
        } else if value > ADVANCED_THRESHOLD {
            BuildTier::Advanced
        } else if value > PROFESSIONAL_THRESHOLD {
            BuildTier::Professional
        } else {
            BuildTier::Basic
        }
    }

    pub fn base_features(self) -> &'static [&'static str] {
        match self {
            BuildTier::Quantum => &["quantum_processing", "parallel_execution", "advanced_ai"],
            BuildTier::Advanced => &["multi_threading", "enhanced_memory", "ai_assist"],
            BuildTier::Professional => &["optimization", "caching", "logging"],
            BuildTier::Basic => &["standard_processing"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildTier::Basic => "basic",
            BuildTier::Professional => "professional",
            BuildTier::Advanced => "advanced",
            BuildTier::Quantum => "quantum",
        }
    }
}

impl fmt::Display for BuildTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternStats {
    pub total_lines: usize,
    pub avg_line_length: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub timestamp: String,
    pub themes: BTreeMap<String, usize>,
    /// Absent when there was no content to analyze.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PatternStats>,
}

/// Detect themes in memory text. Themes with no hits are left out.
pub fn analyze_patterns(content: &str) -> PatternAnalysis {
    let mut analysis = PatternAnalysis {
        timestamp: now_iso8601(),
        themes: BTreeMap::new(),
        stats: None,
    };
    if content.is_empty() {
        return analysis;
    }

    let lines: Vec<String> = content.lines().map(str::to_lowercase).collect();
    for (theme, keywords) in THEMES {
        let count: usize = lines
            .iter()
            .map(|line| keywords.iter().filter(|kw| line.contains(*kw)).count())
            .sum();
        if count > 0 {
            analysis.themes.insert(theme.to_string(), count);
        }
    }

    let total_chars: usize = content.lines().map(|l| l.chars().count()).sum();
    analysis.stats = Some(PatternStats {
        total_lines: lines.len(),
        avg_line_length: total_chars as f64 / lines.len().max(1) as f64,
    });
    analysis
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Equal to the feature count.
    pub optimization_level: usize,
    /// MB.
    pub memory_limit: f64,
    pub thread_count: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildConfig {
    pub timestamp: String,
    pub token_value: f64,
    pub build_tier: BuildTier,
    pub features: Vec<String>,
    pub config: ResourceConfig,
}

/// Map a value and detected themes to a build configuration. Total function.
pub fn build_config(value: f64, themes: &BTreeMap<String, usize>) -> BuildConfig {
    let tier = BuildTier::for_value(value);
    let mut features: Vec<String> = tier.base_features().iter().map(|f| f.to_string()).collect();

    if themes.contains_key("nature") {
        features.push("nature_pattern_recognition".to_string());
    }
    if themes.contains_key("people") {
        features.push("social_analysis".to_string());
    }

    let config = ResourceConfig {
        optimization_level: features.len(),
        memory_limit: (value / 1000.0).min(MAX_MEMORY_LIMIT),
        thread_count: ((value / 1e6) as i64).min(MAX_THREADS),
    };

    BuildConfig {
        timestamp: now_iso8601(),
        token_value: value,
        build_tier: tier,
        features,
        config,
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildArtifact {
    pub timestamp: String,
    pub token_hash: String,
    pub token_value: f64,
    pub patterns: PatternAnalysis,
    pub build_config: BuildConfig,
    pub status: String,
}

/// Analyze `memory_content` and derive the build for `token_value`.
pub fn create_build_artifact(token_hash: &str, token_value: f64, memory_content: &str) -> BuildArtifact {
    let patterns = analyze_patterns(memory_content);
    let build_config = build_config(token_value, &patterns.themes);
    BuildArtifact {
        timestamp: now_iso8601(),
        token_hash: token_hash.to_string(),
        token_value,
        patterns,
        build_config,
        status: "ready".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn no_themes() -> BTreeMap<String, usize> {
        BTreeMap::new()
    }

    #[test]
    fn test_tier_boundaries_are_exclusive() {
        assert_eq!(BuildTier::for_value(999_999.0), BuildTier::Basic);
        assert_eq!(BuildTier::for_value(1e6), BuildTier::Basic);
        assert_eq!(BuildTier::for_value(1e6 + 1.0), BuildTier::Professional);
        assert_eq!(BuildTier::for_value(1e9), BuildTier::Professional);
        assert_eq!(BuildTier::for_value(1e9 + 1.0), BuildTier::Advanced);
        assert_eq!(BuildTier::for_value(1e12), BuildTier::Advanced);
        assert_eq!(BuildTier::for_value(1e12 + 1.0), BuildTier::Quantum);
    }

    #[test]
    fn test_tiers_are_ordered() {
        assert!(BuildTier::Basic < BuildTier::Professional);
        assert!(BuildTier::Advanced < BuildTier::Quantum);
        assert_eq!(BuildTier::Quantum.to_string(), "quantum");
    }

    #[test]
    fn test_demo_value_is_advanced() {
        let build = build_config(18_160_000_000.0, &no_themes());
        assert_eq!(build.build_tier, BuildTier::Advanced);
        assert_eq!(
            build.features,
            vec!["multi_threading", "enhanced_memory", "ai_assist"]
        );
        assert_eq!(build.config.optimization_level, 3);
        assert_eq!(build.config.memory_limit, 1_000_000.0);
        assert_eq!(build.config.thread_count, 64);
    }

    #[test]
    fn test_small_value_config() {
        let build = build_config(2_500_000.0, &no_themes());
        assert_eq!(build.build_tier, BuildTier::Professional);
        assert_relative_eq!(build.config.memory_limit, 2500.0);
        assert_eq!(build.config.thread_count, 2);
    }

    #[test]
    fn test_theme_features_independent_of_tier() {
        let mut themes = BTreeMap::new();
        themes.insert("nature".to_string(), 3);
        themes.insert("people".to_string(), 1);
        themes.insert("emotion".to_string(), 2);

        let basic = build_config(10.0, &themes);
        assert_eq!(
            basic.features,
            vec!["standard_processing", "nature_pattern_recognition", "social_analysis"]
        );
        assert_eq!(basic.config.optimization_level, 3);

        let quantum = build_config(5e12, &themes);
        assert_eq!(quantum.features.len(), 5);
    }

    #[test]
    fn test_analyze_patterns() {
        let content = "The cat walked through the forest.\n\
                       Water flowed in the river nearby.\n\
                       People gathered under the trees.";
        let analysis = analyze_patterns(content);
        // line 1: cat, forest; line 2: water, river; line 3: tree
        assert_eq!(analysis.themes["nature"], 5);
        // line 1: walk; "go" does not occur
        assert_eq!(analysis.themes["action"], 1);
        assert!(!analysis.themes.contains_key("emotion"));
        let stats = analysis.stats.unwrap();
        assert_eq!(stats.total_lines, 3);
        assert!(stats.avg_line_length > 30.0);
    }

    #[test]
    fn test_analyze_empty() {
        let analysis = analyze_patterns("");
        assert!(analysis.themes.is_empty());
        assert!(analysis.stats.is_none());
    }

    #[test]
    fn test_create_build_artifact() {
        let artifact = create_build_artifact("abc", 2e12, "a woman and a child");
        assert_eq!(artifact.status, "ready");
        assert_eq!(artifact.build_config.build_tier, BuildTier::Quantum);
        assert!(
            artifact
                .build_config
                .features
                .contains(&"social_analysis".to_string())
        );
        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(json["build_config"]["build_tier"], "quantum");
    }
}
