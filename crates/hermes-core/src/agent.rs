//! Agent model - the closed set of agent types and their environments

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Specialized agent capable of handling a chat query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Real-time web search
    WebSearch,
    /// Fetch and summarize specific URLs
    UrlPull,
    /// Sandboxed code execution
    CodeInterpreter,
    /// Retrieval over user-local knowledge
    LocalKnowledge,
    /// Language translation
    Translation,
    /// Managed AI-foundry agent
    Foundry,
    /// External third-party agent
    ThirdParty,
    /// Plain conversational chat
    StandardChat,
}

/// Runtime context in which an agent's work happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionEnvironment {
    /// In-process, no external service
    Local,
    /// Managed AI-foundry service
    Foundry,
    /// Sandboxed code runner
    Code,
    /// Third-party service
    ThirdParty,
}

impl AgentType {
    /// All agent types
    pub const ALL: &'static [AgentType] = &[
        Self::WebSearch,
        Self::UrlPull,
        Self::CodeInterpreter,
        Self::LocalKnowledge,
        Self::Translation,
        Self::Foundry,
        Self::ThirdParty,
        Self::StandardChat,
    ];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::UrlPull => "url_pull",
            Self::CodeInterpreter => "code_interpreter",
            Self::LocalKnowledge => "local_knowledge",
            Self::Translation => "translation",
            Self::Foundry => "foundry",
            Self::ThirdParty => "third_party",
            Self::StandardChat => "standard_chat",
        }
    }

    /// Fixed mapping from agent type to execution environment
    #[must_use]
    pub fn environment(&self) -> ExecutionEnvironment {
        match self {
            Self::CodeInterpreter => ExecutionEnvironment::Code,
            Self::LocalKnowledge => ExecutionEnvironment::Local,
            Self::ThirdParty => ExecutionEnvironment::ThirdParty,
            _ => ExecutionEnvironment::Foundry,
        }
    }

    /// Tie-break priority for heuristic classification, lower wins.
    #[must_use]
    pub fn heuristic_priority(&self) -> u8 {
        match self {
            Self::WebSearch => 0,
            Self::LocalKnowledge => 1,
            Self::UrlPull => 2,
            Self::CodeInterpreter => 3,
            Self::Translation => 4,
            Self::Foundry => 5,
            Self::ThirdParty => 6,
            Self::StandardChat => 7,
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web_search" => Ok(Self::WebSearch),
            "url_pull" => Ok(Self::UrlPull),
            "code_interpreter" => Ok(Self::CodeInterpreter),
            "local_knowledge" => Ok(Self::LocalKnowledge),
            "translation" => Ok(Self::Translation),
            "foundry" => Ok(Self::Foundry),
            "third_party" => Ok(Self::ThirdParty),
            "standard_chat" => Ok(Self::StandardChat),
            other => Err(format!("unknown agent type: {other}")),
        }
    }
}

impl ExecutionEnvironment {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Foundry => "foundry",
            Self::Code => "code",
            Self::ThirdParty => "third_party",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_mapping() {
        assert_eq!(
            AgentType::CodeInterpreter.environment(),
            ExecutionEnvironment::Code
        );
        assert_eq!(
            AgentType::LocalKnowledge.environment(),
            ExecutionEnvironment::Local
        );
        assert_eq!(
            AgentType::ThirdParty.environment(),
            ExecutionEnvironment::ThirdParty
        );
        assert_eq!(
            AgentType::WebSearch.environment(),
            ExecutionEnvironment::Foundry
        );
        assert_eq!(
            AgentType::Translation.environment(),
            ExecutionEnvironment::Foundry
        );
    }

    #[test]
    fn test_round_trip_parse() {
        for agent in AgentType::ALL {
            assert_eq!(agent.as_str().parse::<AgentType>().unwrap(), *agent);
        }
        assert!("does_not_exist".parse::<AgentType>().is_err());
    }

    #[test]
    fn test_priority_order() {
        assert!(AgentType::WebSearch.heuristic_priority() < AgentType::LocalKnowledge.heuristic_priority());
        assert!(AgentType::LocalKnowledge.heuristic_priority() < AgentType::UrlPull.heuristic_priority());
        assert!(AgentType::UrlPull.heuristic_priority() < AgentType::CodeInterpreter.heuristic_priority());
        assert!(AgentType::CodeInterpreter.heuristic_priority() < AgentType::StandardChat.heuristic_priority());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&AgentType::WebSearch).unwrap(),
            "\"web_search\""
        );
    }
}
