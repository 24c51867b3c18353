mod bot_config;
pub mod error;

pub use bot_config::{
    BotConfig, ContractEntry, ContractsConfig, ScheduleConfig, WeightsConfig, DEFAULT_RPC_URL,
};
pub use error::Error;

pub type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
pub mod tests {
    use super::*;
    use alloy::primitives::Address;
    use std::{str::FromStr, time::Duration};
    use teabot_core::adapters::TeaCatalog;

    #[test]
    fn parses_botfile_toml() {
        let bot_file = BotConfig::from_file("teabot.toml").unwrap();
        assert_eq!(bot_file.tea_catalog, TeaCatalog::Classic);
        assert!(!bot_file.check_already_voted);
        assert_eq!(bot_file.weights.voting, 0);
        assert_eq!(bot_file.weights.transfer, 8);
        assert_eq!(bot_file.schedule.max_actions_per_window, Some(250));

        // omitted keys keep their defaults
        assert_eq!(bot_file.rpc_timeout_secs, 45);
        assert_eq!(bot_file.schedule.summary_every, 500);
        assert_eq!(bot_file.contracts.chat, ContractsConfig::default().chat);

        let settings = bot_file.to_settings().unwrap();
        assert_eq!(settings.schedule.window, Duration::from_secs(6 * 3600));
        assert_eq!(settings.schedule.period, Duration::from_secs(24 * 3600));
        assert_eq!(
            settings.contracts.token.address,
            Address::from_str("0x89a4C0f4F0E4023ef8B8106DDc9f64681FFd57CD").unwrap()
        );
        assert_eq!(settings.contracts.token.abi, "Teazard");
    }

    #[test]
    fn empty_file_is_default_deployment() {
        let bot_file: BotConfig = toml::from_str("").unwrap();
        assert_eq!(bot_file, BotConfig::default());

        let settings = bot_file.to_settings().unwrap();
        assert_eq!(settings.rpc_url.as_str(), DEFAULT_RPC_URL);
        assert_eq!(settings.rpc_timeout, Duration::from_secs(45));
        assert_eq!(settings.weights.transfer, 5);
        assert_eq!(settings.schedule.min_wait, Duration::from_secs(15));
        assert_eq!(settings.schedule.max_wait, Duration::from_secs(60));
        assert_eq!(settings.schedule.error_backoff, Duration::from_secs(60));
        assert_eq!(settings.tea_catalog, TeaCatalog::Extended);
        assert_eq!(
            settings.contracts.tea_game.address.to_checksum(None),
            "0xcd77Fa493532Af747769A2dc0dd6111a8C3C1E84"
        );
    }

    #[test]
    fn encodes_botfile_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teabot.toml");
        let mut cfg = BotConfig::default();
        cfg.schedule.max_actions_per_window = Some(10);
        cfg.weights.chat = 0;

        cfg.save_toml(&path).unwrap();
        let decoded = BotConfig::from_file(&path).unwrap();
        assert_eq!(decoded, cfg);
    }

    #[test]
    fn rejects_all_zero_weights() {
        let bot_file: BotConfig = toml::from_str(
            "[weights]\ntea_game = 0\nvoting = 0\nchat = 0\ntransfer = 0\n",
        )
        .unwrap();
        assert!(matches!(
            bot_file.to_settings(),
            Err(Error::Invalid {
                field: "weights",
                ..
            })
        ));
    }

    #[test]
    fn rejects_bad_address() {
        let mut cfg = BotConfig::default();
        // checksum broken by flipping one letter's case
        cfg.contracts.voting.address = "0xAe5fd1bdc856fB43151D6b9c09A489d6DDcD751d".to_owned();
        assert!(matches!(
            cfg.to_settings(),
            Err(Error::Invalid {
                field: "contracts.voting",
                ..
            })
        ));
    }

    #[test]
    fn rejects_inverted_wait_bounds() {
        let mut cfg = BotConfig::default();
        cfg.schedule.min_wait_secs = 120;
        let err = cfg.to_settings().unwrap_err();
        assert!(matches!(err, Error::Core(ref e) if e.is_fatal()), "{err}");
    }

    #[test]
    fn rejects_overflowing_window_hours() {
        let bot_file: BotConfig =
            toml::from_str("[schedule]\nwindow_hours = 9223372036854775807\n").unwrap();
        assert!(matches!(
            bot_file.to_settings(),
            Err(Error::Invalid {
                field: "schedule.window_hours",
                ..
            })
        ));
    }

    #[test]
    fn rejects_unknown_catalog() {
        assert!(toml::from_str::<BotConfig>("tea_catalog = \"deluxe\"").is_err());
    }
}
