use super::*;
use crate::config::test_env_lock;

/// # Safety
/// Callers hold `test_env_lock` so no other test mutates the environment.
unsafe fn clear_llm_env() {
    unsafe {
        std::env::remove_var("LLM_PROVIDER");
        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_API_KEY_ENV");
        std::env::remove_var("LLM_OPENAI_MODE");
        std::env::remove_var("LLM_OPENAI_BASE_URL");
        std::env::remove_var("LLM_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("LLM_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("ANTHROPIC_API_KEY");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("TEST_KEY");
    }
}

#[test]
fn from_env_defaults_to_openai_chat_completions() {
    let _guard = test_env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
    }

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.model, "gpt-3.5-turbo");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::ChatCompletions);
    assert_eq!(cfg.base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        HttpTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.api_key, "sk-test");

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_parses_anthropic_with_custom_key_var() {
    let _guard = test_env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_PROVIDER", "anthropic");
        std::env::set_var("LLM_API_KEY_ENV", "TEST_KEY");
        std::env::set_var("TEST_KEY", "secret");
        std::env::set_var("LLM_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("LLM_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-sonnet-4-5-20250929");
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.base_url, DEFAULT_ANTHROPIC_BASE_URL);
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_trims_openai_base_url() {
    let _guard = test_env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("LLM_OPENAI_MODE", "responses");
        std::env::set_var("LLM_OPENAI_BASE_URL", "https://example.test/v1/");
        std::env::set_var("LLM_MODEL", "gpt-4o-mini");
    }

    let cfg = LlmConfig::from_env().unwrap();
    assert_eq!(cfg.openai_mode, OpenAiApiMode::Responses);
    assert_eq!(cfg.base_url, "https://example.test/v1");
    assert_eq!(cfg.model, "gpt-4o-mini");

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_missing_key_errors() {
    let _guard = test_env_lock();
    unsafe { clear_llm_env() };

    let err = LlmConfig::from_env().unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { ref var } if var == "OPENAI_API_KEY"));
}

#[test]
fn from_env_blank_key_errors() {
    let _guard = test_env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("OPENAI_API_KEY", "   ");
    }

    assert!(matches!(LlmConfig::from_env(), Err(LlmError::MissingApiKey { .. })));

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_unknown_provider_errors() {
    let _guard = test_env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("LLM_PROVIDER", "bad");
        std::env::set_var("OPENAI_API_KEY", "sk-test");
    }

    let err = LlmConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));

    unsafe { clear_llm_env() };
}

#[test]
fn from_env_unknown_openai_mode_errors() {
    let _guard = test_env_lock();
    unsafe {
        clear_llm_env();
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("LLM_OPENAI_MODE", "bad_mode");
    }

    let err = LlmConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("unsupported openai_api mode"));

    unsafe { clear_llm_env() };
}
