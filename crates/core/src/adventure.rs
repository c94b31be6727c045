//! Adventure parameters and the prompt templates they are rendered into.
//!
//! Parameters are never validated: whatever the client sends is interpolated
//! into the prompt as-is. Missing fields and `null` render as empty strings,
//! other non-string JSON values render as their JSON text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// AdventureRequest
// ---------------------------------------------------------------------------

/// Body of `POST /generate-adventure`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventureRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub system: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub players: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub experience: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub genre: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub tone: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub concept: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// PromptTemplate
// ---------------------------------------------------------------------------

/// Which prompt layout to render adventure parameters into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptTemplate {
    /// Header plus the parameter list.
    Brief,
    /// Brief layout plus a minimum length and the required module structure.
    #[default]
    Detailed,
}

impl PromptTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brief => "brief",
            Self::Detailed => "detailed",
        }
    }
}

impl FromStr for PromptTemplate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" => Ok(Self::Brief),
            "detailed" => Ok(Self::Detailed),
            other => Err(CoreError::Validation(format!(
                "Unknown prompt template '{other}' (expected 'brief' or 'detailed')"
            ))),
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

const REQUIRED_STRUCTURE: &str = "\
**Required Structure:**
1. **# Title:** Come up with a creative title for the adventure.
2. **## Adventure Synopsis:** A short summary for the Game Master.
3. **## Player Hooks:** Provide three distinct plot hooks to get the players involved.
4. **## Key Scenes & Encounters:** Detail the main sequence of events. Include balanced combat, social, and exploration challenges.
5. **## Key NPCs and Monsters:** List important characters and creatures with brief descriptions. If the system is D&D 5e or Pathfinder, include mechanically appropriate stat blocks.
6. **## Maps & Artwork Ideas:** Describe key map locations (e.g., \"A two-story tavern with a secret basement\") and character art concepts.
7. **## Conclusion:** Describe how the adventure might conclude and potential rewards for the players.
";

/// Render the prompt sent to the provider for `request`.
pub fn build_prompt(request: &AdventureRequest, template: PromptTemplate) -> String {
    let mut prompt = format!(
        "Create a complete, professionally formatted TTRPG adventure module.\n\
         The final output should be in Markdown format.\n\
         \n\
         **Adventure Parameters:**\n\
         - **Game System:** {}\n\
         - **Number of Players:** {}\n\
         - **Player Experience Level:** {}\n\
         - **Genre:** {}\n\
         - **Tone:** {}\n\
         - **Core Concept:** {}\n",
        request.system,
        request.players,
        request.experience,
        request.genre,
        request.tone,
        request.concept,
    );

    if template == PromptTemplate::Detailed {
        prompt.push_str("- **Minimum length:** 5 A4 pages\n\n");
        prompt.push_str(REQUIRED_STRUCTURE);
    }

    prompt
}
