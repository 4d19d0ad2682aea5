use std::ops::RangeInclusive;
use std::str::FromStr;

use facade::elevation::Elevation;
use facade::reference::RepairTypeCode;
use rust_decimal::Decimal;
use tracking::phase::Phase;
use tracking::project::{PhaseCount, RepairTypeConfig};

/// Parses '<NAME>:<DROPS>:<LEVELS>', e.g. 'North:5:10'
pub fn elevation_parser(s: &str) -> Result<Elevation, String> {
    let chunks: Vec<_> = s.split(':').collect();
    let [name, drops, levels] = chunks[..] else {
        return Err(format!(
            "Invalid elevation. Required format: '<NAME>:<DROPS>:<LEVELS>', found: '{}'",
            s
        ));
    };

    let drops = u32::from_str(drops).map_err(|e| format!("Invalid drop count '{}': {}", drops, e))?;
    let levels = u32::from_str(levels).map_err(|e| format!("Invalid level count '{}': {}", levels, e))?;

    Ok(Elevation::new(name, drops, levels))
}

/// Parses '<CODE>:<PHASES>:<UNIT>:<PRICE>[:<MINIMUM_CHARGE>]', e.g. 'CR:5:m3:950' or 'CR:5:m3:950:50'
pub fn repair_type_config_parser(s: &str) -> Result<RepairTypeConfig, String> {
    let chunks: Vec<_> = s.split(':').collect();
    let (code, phases, unit, price, minimum_charge) = match chunks[..] {
        [code, phases, unit, price] => (code, phases, unit, price, None),
        [code, phases, unit, price, minimum_charge] => (code, phases, unit, price, Some(minimum_charge)),
        _ => {
            return Err(format!(
                "Invalid repair type. Required format: '<CODE>:<PHASES>:<UNIT>:<PRICE>[:<MINIMUM_CHARGE>]', found: '{}'",
                s
            ))
        }
    };

    let code = RepairTypeCode::from_str(code).map_err(|e| e.to_string())?;
    let phases = u8::from_str(phases)
        .map_err(|e| format!("Invalid phase count '{}': {}", phases, e))
        .and_then(|phases| PhaseCount::try_from(phases).map_err(|e| e.to_string()))?;
    let price = Decimal::from_str(price).map_err(|e| format!("Invalid price '{}': {}", price, e))?;

    let mut config = RepairTypeConfig::new(code, phases, unit.to_string(), price);
    if let Some(minimum_charge) = minimum_charge {
        config.minimum_charge = Decimal::from_str(minimum_charge)
            .map_err(|e| format!("Invalid minimum charge '{}': {}", minimum_charge, e))?;
    }

    Ok(config)
}

/// Parses '<FIELD>=<VALUE>', e.g. 'width=100'
pub fn measurement_parser(s: &str) -> Result<(String, Decimal), String> {
    let chunks: Vec<_> = s.split('=').collect();
    if chunks.len() != 2 {
        return Err(format!("Expected exactly 1 equal sign in '{}', found {}", s, chunks.len() - 1));
    }

    let field = chunks[0].trim();
    let value_str = chunks[1].trim();
    if field.is_empty() {
        return Err(format!("Missing field name in '{}'", s));
    }

    let value = value_str
        .parse::<Decimal>()
        .map_err(|e| format!("Failed to parse decimal value for field '{}': {}", field, e))?;

    Ok((field.to_string(), value))
}

/// Parses '<FIRST>-<LAST>' or a single number, e.g. '3-7' or '4'
pub fn range_parser(s: &str) -> Result<RangeInclusive<u32>, String> {
    let (first, last) = s.split_once('-').unwrap_or((s, s));

    let first = u32::from_str(first.trim()).map_err(|e| format!("Invalid range start '{}': {}", first, e))?;
    let last = u32::from_str(last.trim()).map_err(|e| format!("Invalid range end '{}': {}", last, e))?;

    if first > last {
        return Err(format!("Range start must not be after the end, found: '{}'", s));
    }

    Ok(first..=last)
}

/// Parses 'S', 'P<n>' or 'F'
pub fn phase_parser(s: &str) -> Result<Phase, String> {
    Phase::from_str(s).map_err(|e| e.to_string())
}
