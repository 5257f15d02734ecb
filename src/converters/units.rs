//! Unit conversion within length, mass, volume and temperature

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, CalcError, CalcResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Length,
    Mass,
    Volume,
    Temperature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    // Length
    Millimeter,
    Centimeter,
    Meter,
    Kilometer,
    Inch,
    Foot,
    Yard,
    Mile,
    // Mass
    Milligram,
    Gram,
    Kilogram,
    Tonne,
    Ounce,
    Pound,
    // Volume
    Milliliter,
    Liter,
    CubicMeter,
    Teaspoon,
    Tablespoon,
    FluidOunce,
    Cup,
    Pint,
    Quart,
    Gallon,
    // Temperature
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        use Unit::*;
        match self {
            Millimeter | Centimeter | Meter | Kilometer | Inch | Foot | Yard | Mile => {
                Dimension::Length
            }
            Milligram | Gram | Kilogram | Tonne | Ounce | Pound => Dimension::Mass,
            Milliliter | Liter | CubicMeter | Teaspoon | Tablespoon | FluidOunce | Cup | Pint
            | Quart | Gallon => Dimension::Volume,
            Celsius | Fahrenheit | Kelvin => Dimension::Temperature,
        }
    }

    /// Size of one unit in the dimension's base unit (meter, kilogram, liter).
    /// Temperatures are affine and handled separately.
    fn factor(self) -> f64 {
        use Unit::*;
        match self {
            Millimeter => 0.001,
            Centimeter => 0.01,
            Meter => 1.0,
            Kilometer => 1_000.0,
            Inch => 0.0254,
            Foot => 0.3048,
            Yard => 0.9144,
            Mile => 1_609.344,
            Milligram => 1e-6,
            Gram => 0.001,
            Kilogram => 1.0,
            Tonne => 1_000.0,
            Ounce => 0.028_349_523_125,
            Pound => 0.453_592_37,
            Milliliter => 0.001,
            Liter => 1.0,
            CubicMeter => 1_000.0,
            // US customary
            Teaspoon => 0.004_928_921_593_75,
            Tablespoon => 0.014_786_764_781_25,
            FluidOunce => 0.029_573_529_562_5,
            Cup => 0.236_588_236_5,
            Pint => 0.473_176_473,
            Quart => 0.946_352_946,
            Gallon => 3.785_411_784,
            Celsius | Fahrenheit | Kelvin => 1.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        use Unit::*;
        match self {
            Millimeter => "mm",
            Centimeter => "cm",
            Meter => "m",
            Kilometer => "km",
            Inch => "in",
            Foot => "ft",
            Yard => "yd",
            Mile => "mi",
            Milligram => "mg",
            Gram => "g",
            Kilogram => "kg",
            Tonne => "t",
            Ounce => "oz",
            Pound => "lb",
            Milliliter => "ml",
            Liter => "l",
            CubicMeter => "m3",
            Teaspoon => "tsp",
            Tablespoon => "tbsp",
            FluidOunce => "floz",
            Cup => "cup",
            Pint => "pt",
            Quart => "qt",
            Gallon => "gal",
            Celsius => "c",
            Fahrenheit => "f",
            Kelvin => "k",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Unit::*;
        let unit = match s.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" => Millimeter,
            "cm" | "centimeter" | "centimeters" => Centimeter,
            "m" | "meter" | "meters" => Meter,
            "km" | "kilometer" | "kilometers" => Kilometer,
            "in" | "inch" | "inches" => Inch,
            "ft" | "foot" | "feet" => Foot,
            "yd" | "yard" | "yards" => Yard,
            "mi" | "mile" | "miles" => Mile,
            "mg" | "milligram" | "milligrams" => Milligram,
            "g" | "gram" | "grams" => Gram,
            "kg" | "kilogram" | "kilograms" => Kilogram,
            "t" | "tonne" | "tonnes" => Tonne,
            "oz" | "ounce" | "ounces" => Ounce,
            "lb" | "lbs" | "pound" | "pounds" => Pound,
            "ml" | "milliliter" | "milliliters" => Milliliter,
            "l" | "liter" | "liters" => Liter,
            "m3" | "cubic_meter" | "cubic_meters" => CubicMeter,
            "tsp" | "teaspoon" | "teaspoons" => Teaspoon,
            "tbsp" | "tablespoon" | "tablespoons" => Tablespoon,
            "floz" | "fl_oz" | "fluid_ounce" | "fluid_ounces" => FluidOunce,
            "cup" | "cups" => Cup,
            "pt" | "pint" | "pints" => Pint,
            "qt" | "quart" | "quarts" => Quart,
            "gal" | "gallon" | "gallons" => Gallon,
            "c" | "celsius" => Celsius,
            "f" | "fahrenheit" => Fahrenheit,
            "k" | "kelvin" => Kelvin,
            _ => return Err(CalcError::invalid("unit", format!("unknown unit '{s}'"))),
        };
        Ok(unit)
    }
}

fn to_kelvin(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Celsius => value + 273.15,
        Unit::Fahrenheit => (value - 32.0) * 5.0 / 9.0 + 273.15,
        _ => value,
    }
}

fn from_kelvin(kelvin: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Celsius => kelvin - 273.15,
        Unit::Fahrenheit => (kelvin - 273.15) * 9.0 / 5.0 + 32.0,
        _ => kelvin,
    }
}

/// Convert `value` between two units of the same dimension
pub fn convert(value: f64, from: Unit, to: Unit) -> CalcResult<f64> {
    ensure_finite("value", value)?;
    if from.dimension() != to.dimension() {
        return Err(CalcError::DimensionMismatch {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    if from == to {
        return Ok(value);
    }

    Ok(match from.dimension() {
        Dimension::Temperature => from_kelvin(to_kelvin(value, from), to),
        _ => value * from.factor() / to.factor(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_length() {
        assert_relative_eq!(convert(1.0, Unit::Mile, Unit::Kilometer).unwrap(), 1.609344, epsilon = 1e-12);
        assert_relative_eq!(convert(12.0, Unit::Inch, Unit::Foot).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mass_and_volume() {
        assert_relative_eq!(convert(16.0, Unit::Ounce, Unit::Pound).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(convert(1.0, Unit::Gallon, Unit::Quart).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(convert(3.0, Unit::Teaspoon, Unit::Tablespoon).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_temperature() {
        assert_relative_eq!(convert(100.0, Unit::Celsius, Unit::Fahrenheit).unwrap(), 212.0, epsilon = 1e-10);
        assert_relative_eq!(convert(-40.0, Unit::Fahrenheit, Unit::Celsius).unwrap(), -40.0, epsilon = 1e-10);
        assert_relative_eq!(convert(0.0, Unit::Kelvin, Unit::Celsius).unwrap(), -273.15, epsilon = 1e-10);
    }

    #[test]
    fn test_cross_dimension_is_error() {
        let err = convert(1.0, Unit::Meter, Unit::Kilogram);
        assert!(matches!(err, Err(CalcError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_parse() {
        assert_eq!("Feet".parse::<Unit>().unwrap(), Unit::Foot);
        assert_eq!("lbs".parse::<Unit>().unwrap(), Unit::Pound);
        assert!("furlong".parse::<Unit>().is_err());
    }
}
