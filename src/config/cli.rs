use crate::domain::model::GeoPoint;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "atm-finder")]
#[command(about = "Find recommended ATMs near a location and route to the best one")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "atm-finder.toml")]
    pub config: String,

    /// User latitude in degrees
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// User longitude in degrees
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Override ranking.shortlist_size
    #[arg(short = 'k', long)]
    pub shortlist_size: Option<usize>,

    /// Print the final state as JSON
    #[arg(long)]
    pub json: bool,

    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Rank only, without calling the remote services
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    pub fn location(&self) -> Result<Option<GeoPoint>> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => GeoPoint::new(lat, lon).map(Some),
            _ => Ok(None),
        }
    }
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("config", &self.config)?;
        if let Some(lat) = self.lat {
            validation::validate_range("lat", lat, -90.0, 90.0)?;
        }
        if let Some(lon) = self.lon {
            validation::validate_range("lon", lon, -180.0, 180.0)?;
        }
        if let Some(size) = self.shortlist_size {
            validation::validate_positive_number("shortlist-size", size, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location_flags() {
        let args = CliArgs::parse_from(["atm-finder", "--lat", "-33.86", "--lon", "151.2", "-k", "3"]);
        assert!(args.validate().is_ok());
        let location = args.location().unwrap().unwrap();
        assert_eq!(location.latitude(), -33.86);
        assert_eq!(args.shortlist_size, Some(3));
        assert_eq!(args.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_lat_requires_lon() {
        assert!(CliArgs::try_parse_from(["atm-finder", "--lat", "41.0"]).is_err());
    }

    #[test]
    fn test_out_of_range_location_fails_validation() {
        let args = CliArgs::parse_from(["atm-finder", "--lat", "120", "--lon", "29"]);
        assert!(args.validate().is_err());
        assert!(args.location().is_err());
    }

    #[test]
    fn test_zero_shortlist_fails_validation() {
        let args = CliArgs::parse_from(["atm-finder", "-k", "0"]);
        assert!(args.validate().is_err());
    }
}
