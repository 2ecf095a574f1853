use super::*;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.cache.list_ttl_secs, 120);
    assert_eq!(settings.cache.detail_ttl_secs, 600);
    assert_eq!(settings.cache.registry_key, "cache:keys");
    assert!(settings.cache.enabled);
    assert!(settings.auth.admin_token.is_none());
    assert!(settings.cors.allowed_origins.is_empty());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());
    raw.cache.list_ttl_seconds = Some(30);

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        cache_list_ttl_seconds: Some(45),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(settings.cache.list_ttl_secs, 45);
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn blank_admin_token_counts_as_unset() {
    let mut raw = RawSettings::default();
    raw.auth.admin_token = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.auth.admin_token.is_none());
}

#[test]
fn admin_token_is_redacted_in_debug_output() {
    let auth = AuthSettings {
        admin_token: Some("hunter2".to_string()),
    };
    let rendered = format!("{auth:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn rejects_zero_cache_timeout() {
    let mut raw = RawSettings::default();
    raw.cache.response_timeout_ms = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero timeout rejected");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.response_timeout_ms",
            ..
        }
    ));
}

#[test]
fn rejects_non_redis_url() {
    let mut raw = RawSettings::default();
    raw.cache.redis_url = Some("http://localhost:6379".to_string());
    let err = Settings::from_raw(raw).expect_err("http scheme rejected");
    assert!(matches!(err, LoadError::Invalid { key: "cache.redis_url", .. }));
}

#[test]
fn wildcard_origin_allows_everything() {
    let mut raw = RawSettings::default();
    raw.cors.allowed_origins = Some(vec![
        "https://pinkdreams.example/".to_string(),
        "*".to_string(),
    ]);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.cors.allowed_origins.is_empty());
}

#[test]
fn origins_are_normalized() {
    let mut raw = RawSettings::default();
    raw.cors.allowed_origins = Some(vec![
        " https://pinkdreams.example/ ".to_string(),
        String::new(),
    ]);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.cors.allowed_origins,
        vec!["https://pinkdreams.example".to_string()]
    );
}

#[test]
fn rejects_zero_rate_limit() {
    let mut raw = RawSettings::default();
    raw.rate_limit.max_requests = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["pinkdreams"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_migrate_arguments() {
    let args = CliArgs::parse_from([
        "pinkdreams",
        "migrate",
        "--database-url",
        "postgres://example",
    ]);

    match args.command.expect("migrate command") {
        Command::Migrate(migrate) => {
            assert_eq!(
                migrate.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "pinkdreams",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--redis-url",
        "redis://cache:6379",
        "--cache-enabled",
        "false",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.redis_url.as_deref(),
                Some("redis://cache:6379")
            );
            assert_eq!(serve.overrides.cache_enabled, Some(false));
        }
        _ => panic!("wrong command parsed"),
    }
}
