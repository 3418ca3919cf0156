//! User load model: turns concurrency, request shape and the optional
//! multi-agent workflow parameters into aggregate throughput and call
//! rates.

use crate::config::Configuration;
use crate::sizing::safe_divide;

pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadProfile {
    pub required_tokens_per_sec: f64,
    pub llm_calls_per_sec: f64,
    pub tool_calls_per_sec: f64,
    pub annual_external_tool_cost_usd: f64,
}

/// Aggregate load for a scenario.
///
/// With agent mode off (or an agentic share of zero) every request is a
/// single LLM call of `tokens_per_request` tokens. Otherwise the user
/// population splits into an agentic fraction, whose tasks fan out into
/// `agents x llm_calls_per_agent` internal calls plus one final
/// response and `agents x tool_calls_per_agent` external tool calls,
/// and a simple fraction behaving as before.
pub fn compute_load(cfg: &Configuration) -> LoadProfile {
    let users = f64::from(cfg.concurrent_users);
    let response_time = cfg.response_time_sec;
    let simple_tokens = f64::from(cfg.tokens_per_request);
    let agent_share = if cfg.agent_mode {
        (cfg.agent_request_percentage / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut required_tokens_per_sec = 0.0;
    let mut llm_calls_per_sec = 0.0;
    let mut tool_calls_per_sec = 0.0;
    let mut annual_external_tool_cost_usd = 0.0;

    if agent_share > 0.0 {
        let internal_tokens = cfg.avg_agents_per_task * cfg.avg_llm_calls_per_agent
            * cfg.avg_agent_llm_tokens;
        let effective_tokens = internal_tokens + simple_tokens;
        let llm_calls_per_task = cfg.avg_agents_per_task * cfg.avg_llm_calls_per_agent + 1.0;
        let tool_calls_per_task = cfg.avg_agents_per_task * cfg.avg_tool_calls_per_agent;

        required_tokens_per_sec +=
            safe_divide(users * agent_share * effective_tokens, response_time);
        llm_calls_per_sec += safe_divide(users * agent_share * llm_calls_per_task, response_time);
        tool_calls_per_sec = safe_divide(users * agent_share * tool_calls_per_task, response_time);
        annual_external_tool_cost_usd =
            tool_calls_per_sec * cfg.avg_external_tool_cost_usd * SECONDS_PER_YEAR;
    }

    required_tokens_per_sec +=
        safe_divide(users * (1.0 - agent_share) * simple_tokens, response_time);
    llm_calls_per_sec += safe_divide(users * (1.0 - agent_share), response_time);

    LoadProfile {
        required_tokens_per_sec,
        llm_calls_per_sec,
        tool_calls_per_sec,
        annual_external_tool_cost_usd,
    }
}
