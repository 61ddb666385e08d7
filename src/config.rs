use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub log_to_file: bool,
    pub log_dir: String,
    pub engine: EngineConfig,
}

/// Tunables for the progress aggregation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target pace used for ahead / on-track / behind classification.
    pub expected_lessons_per_week: f64,
    /// Course length assumed when a learner has no lesson-progress rows.
    pub course_lesson_fallback: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expected_lessons_per_week: 5.0,
            course_lesson_fallback: 30,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let expected_lessons_per_week = std::env::var("PACE_TARGET_LESSONS_PER_WEEK")
            .ok()
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| *value > 0.0)
            .unwrap_or(defaults.expected_lessons_per_week);

        let course_lesson_fallback = std::env::var("COURSE_LESSON_FALLBACK")
            .ok()
            .and_then(|value| value.parse::<i64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(defaults.course_lesson_fallback);

        Self {
            expected_lessons_per_week,
            course_lesson_fallback,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let log_to_file = std::env::var("ENABLE_FILE_LOGS")
            .map(|value| truthy(&value))
            .unwrap_or(false);
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string());

        Self {
            host,
            port,
            log_level,
            log_to_file,
            log_dir,
            engine: EngineConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn truthy(value: &str) -> bool {
    value == "true" || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_accepts_true_and_one_only() {
        assert!(truthy("true"));
        assert!(truthy("1"));
        assert!(!truthy("false"));
        assert!(!truthy("0"));
        assert!(!truthy("yes"));
    }
}
