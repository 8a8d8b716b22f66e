//! Agent definitions and instruction rendering.
//!
//! Instructions are rebuilt for every model call so the date and time in the
//! context block stay current.

use chrono::{DateTime, Local};

/// Default location placed in the prompt context.
pub const DEFAULT_LOCATION: &str = "Conshohocken, PA 19428";

/// Live values substituted into an instruction.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub location: String,
    pub now: DateTime<Local>,
}

impl PromptContext {
    /// Context for `location` at the current local time.
    pub fn now(location: impl Into<String>) -> Self {
        Self::at(location, Local::now())
    }

    pub fn at(location: impl Into<String>, now: DateTime<Local>) -> Self {
        Self {
            location: location.into(),
            now,
        }
    }

    /// `YYYY-MM-DD`.
    pub fn date(&self) -> String {
        self.now.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM:SS.ffffff`.
    pub fn time(&self) -> String {
        self.now.format("%H:%M:%S%.6f").to_string()
    }
}

const SPOKEN_OUTPUT_RULES: &[&str] = &[
    "All numbers MUST be spelled out in words.",
    "Units MUST be written in full words.",
    "Abbreviations, symbols, and numerals are NOT allowed.",
    "Sentences MUST be short and declarative.",
    "Write exactly what should be spoken aloud.",
];

const ASSISTANT_PERSONA: &str =
    "You are a personal and home assistant running locally in a private setting for adults.";

const ASSISTANT_BEHAVIOR: &[&str] = &[
    "Responses must be factual, objective, and concise.",
    "Do not moralize.",
    "Do not add disclaimers unless explicitly required.",
    "Do not answer any question without using tools to get the answer.",
];

const WEB_TOOLING: &[&str] = &[
    "Use web_search to find relevant URLs.",
    "Use read_web_page to read a URL and extract visible text.",
];

/// Instruction template: opening lines followed by bulleted sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Opening paragraph, one sentence per line.
    pub role: Vec<String>,
    /// `Behavior:` bullets.
    pub behavior: Vec<String>,
    /// Include the mandatory spoken-output section.
    pub spoken_output: bool,
    /// `Tooling:` bullets; the section is omitted when empty.
    pub tooling: Vec<String>,
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

impl Instruction {
    /// Render with the given context.
    pub fn render(&self, ctx: &PromptContext) -> String {
        let mut sections: Vec<String> = Vec::new();
        if !self.role.is_empty() {
            sections.push(self.role.join("\n"));
        }
        if !self.behavior.is_empty() {
            sections.push(bulleted("Behavior:", self.behavior.iter()));
        }
        if self.spoken_output {
            sections.push(bulleted(
                "Spoken-output requirements (mandatory):",
                SPOKEN_OUTPUT_RULES.iter(),
            ));
        }
        sections.push(bulleted(
            "Context:",
            [
                format!("Location: {}", ctx.location),
                format!("Date: {}", ctx.date()),
                format!("Time: {}", ctx.time()),
            ]
            .iter(),
        ));
        if !self.tooling.is_empty() {
            sections.push(bulleted("Tooling:", self.tooling.iter()));
        }
        sections.join("\n\n").trim().to_owned()
    }
}

fn bulleted<I, S>(heading: &str, items: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = heading.to_owned();
    for item in items {
        out.push_str("\n- ");
        out.push_str(item.as_ref());
    }
    out
}

/// A named bundle of instruction, tool names and sub-agents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDefinition {
    pub name: String,
    /// Shown to a parent agent when this agent is offered as a delegate.
    pub description: String,
    pub instruction: Instruction,
    /// Names resolved against the tool registry when the agent is built.
    pub tools: Vec<String>,
    pub sub_agents: Vec<AgentDefinition>,
}

/// Single-agent assistant with web search and page reading.
pub fn root_agent() -> AgentDefinition {
    AgentDefinition {
        name: "root_agent".into(),
        description: "Personal/home assistant with web search and page reading tools.".into(),
        instruction: Instruction {
            role: vec![ASSISTANT_PERSONA.into()],
            behavior: lines(ASSISTANT_BEHAVIOR),
            spoken_output: true,
            tooling: lines(WEB_TOOLING),
        },
        tools: vec!["web_search".into(), "read_web_page".into()],
        sub_agents: Vec::new(),
    }
}

/// Fact lookup worker.
pub fn worker_agent() -> AgentDefinition {
    let mut behavior = vec![
        "All answers should be looked up. Do not reply with anything that wasn't found through a web search."
            .to_owned(),
    ];
    behavior.extend(lines(ASSISTANT_BEHAVIOR));
    AgentDefinition {
        name: "worker_agent".into(),
        description: "Worker for general fact based questions that require looking up the answers."
            .into(),
        instruction: Instruction {
            role: vec![
                "You are primarily a worker for general fact based questions that require looking up the answers."
                    .into(),
            ],
            behavior,
            spoken_output: true,
            tooling: lines(WEB_TOOLING),
        },
        tools: vec!["web_search".into(), "read_web_page".into()],
        sub_agents: Vec::new(),
    }
}

/// Weather forecaster.
pub fn weather_agent() -> AgentDefinition {
    AgentDefinition {
        name: "weather_agent".into(),
        description: "Provides weather forecasts.".into(),
        instruction: Instruction {
            role: vec!["You provide weather forecasts.".into()],
            behavior: vec![
                "All answers should be looked up using the tools. Do not reply with any information that didn't result from a tool call."
                    .into(),
            ],
            spoken_output: true,
            tooling: Vec::new(),
        },
        tools: vec!["get_weather".into()],
        sub_agents: Vec::new(),
    }
}

/// Router that hands requests to the worker or weather agent.
///
/// Named `root_agent` inside its own tree, like the single-agent assistant.
pub fn orchestrator() -> AgentDefinition {
    AgentDefinition {
        name: "root_agent".into(),
        description: "Personal/home assistant that routes requests to specialised agents.".into(),
        instruction: Instruction {
            role: vec![
                ASSISTANT_PERSONA.into(),
                "You decide which specialized agent should handle the user request.".into(),
                "Transfer control when appropriate.".into(),
            ],
            behavior: lines(ASSISTANT_BEHAVIOR),
            spoken_output: true,
            tooling: Vec::new(),
        },
        tools: Vec::new(),
        sub_agents: vec![worker_agent(), weather_agent()],
    }
}

/// Names accepted by [`builtin`].
pub const BUILTIN_AGENTS: &[&str] = &["root_agent", "orchestrator", "worker_agent", "weather_agent"];

/// Look up a built-in agent by configuration name.
pub fn builtin(name: &str) -> Option<AgentDefinition> {
    match name {
        "root_agent" => Some(root_agent()),
        "orchestrator" => Some(orchestrator()),
        "worker_agent" => Some(worker_agent()),
        "weather_agent" => Some(weather_agent()),
        _ => None,
    }
}
