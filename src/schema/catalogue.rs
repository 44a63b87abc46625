//! Built-in field catalogue for marine sampling expeditions
//!
//! Used whenever no `schema_file` is configured. Field names follow Darwin
//! Core where a term exists.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::bounds::{DateBound, TimeBound};
use super::types::{CompareOp, FieldSpec, ValidationRule};

pub const EVENT_ID: &str = "eventID";
pub const PARENT_EVENT_ID: &str = "parentEventID";
pub const GEAR_TYPE: &str = "gearType";
pub const SAMPLE_TYPE: &str = "sampleType";
pub const SAMPLE_LOCATION: &str = "sampleLocation";
pub const CRUISE_NUMBER: &str = "cruiseNumber";
pub const STATION_NAME: &str = "stationName";

const DWC: &str = "http://rs.tdwg.org/dwc/terms/";

fn list(values: &[&str]) -> ValidationRule {
    ValidationRule::List {
        allowed: values.iter().map(|v| v.to_string()).collect::<BTreeSet<_>>(),
    }
}

fn uuid_rule() -> ValidationRule {
    ValidationRule::LengthCompare {
        op: CompareOp::Eq,
        length: 36,
    }
}

fn decimal(op: CompareOp, threshold: f64) -> ValidationRule {
    ValidationRule::NumberCompare {
        op,
        threshold,
        integer: false,
    }
}

fn integer(op: CompareOp, threshold: f64) -> ValidationRule {
    ValidationRule::NumberCompare {
        op,
        threshold,
        integer: true,
    }
}

fn between(min: f64, max: f64) -> ValidationRule {
    ValidationRule::NumberBetween {
        min,
        max,
        integer: false,
    }
}

fn text(name: &str, display: &str) -> FieldSpec {
    FieldSpec::new(name, display, ValidationRule::FreeText)
}

fn date_rule() -> ValidationRule {
    ValidationRule::DateBetween {
        min: DateBound::Fixed(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()),
        max: DateBound::Today { offset_days: 2 },
    }
}

fn time_rule() -> ValidationRule {
    ValidationRule::TimeBetween {
        min: TimeBound::DayFraction(0.0),
        max: TimeBound::DayFraction(0.9999999),
    }
}

fn latitude(name: &str, display: &str) -> FieldSpec {
    FieldSpec::new(name, display, between(-90.0, 90.0))
        .inheritable()
        .with_units("degrees_north")
        .with_format("0.0000")
}

fn longitude(name: &str, display: &str) -> FieldSpec {
    FieldSpec::new(name, display, between(-180.0, 180.0))
        .inheritable()
        .with_units("degree_east")
        .with_format("0.0000")
}

fn measurement(name: &str, display: &str, units: &str, op: CompareOp, threshold: f64) -> FieldSpec {
    FieldSpec::new(name, display, decimal(op, threshold))
        .with_units(units)
        .with_format("0.0000")
}

/// Returns the built-in catalogue in template column order
pub fn builtin_fields() -> Vec<FieldSpec> {
    let mut fields = vec![
        // Identity and hierarchy
        FieldSpec::new(EVENT_ID, "Sample ID", uuid_rule())
            .required()
            .with_width(38)
            .with_dwc_id(format!("{}eventID", DWC))
            .with_description("36 character UUID including 4 '-', usually read with a code reader"),
        FieldSpec::new(PARENT_EVENT_ID, "Parent sample UUID", uuid_rule())
            .required()
            .with_width(38)
            .with_dwc_id(format!("{}parentEventID", DWC))
            .with_description("ID of the sample this subsample was taken from"),
        FieldSpec::new(
            CRUISE_NUMBER,
            "Cruise number",
            list(&["2018616", "2018791", "2018707", "2018709", "2018710"]),
        )
        .inheritable()
        .required(),
        text("cruiseName", "Cruise name").inheritable(),
        text("statID", "Local Station ID").inheritable().with_width(13),
        text(STATION_NAME, "Station Name")
            .inheritable()
            .required()
            .with_width(13),
        // Time and place
        FieldSpec::new("eventDate", "Date", date_rule())
            .inheritable()
            .required()
            .with_width(12)
            .with_format("yyyy-mm-dd")
            .with_dwc_id(format!("{}eventDate", DWC))
            .with_description("From 2000-01-01 to today +2 days"),
        FieldSpec::new("start_date", "Start date", date_rule())
            .inheritable()
            .with_format("yyyy-mm-dd"),
        FieldSpec::new("end_date", "End date", date_rule())
            .inheritable()
            .with_format("yyyy-mm-dd"),
        FieldSpec::new("eventTime", "Time (UTC)", time_rule())
            .inheritable()
            .required()
            .with_width(13)
            .with_format("hh:mm")
            .with_dwc_id(format!("{}eventTime", DWC)),
        FieldSpec::new("middle_time", "Middle time", time_rule())
            .inheritable()
            .with_format("hh:mm"),
        FieldSpec::new("end_time", "End time", time_rule())
            .inheritable()
            .with_format("hh:mm"),
        latitude("decimalLatitude", "Latitude")
            .required()
            .with_width(10)
            .with_dwc_id(format!("{}decimalLatitude", DWC)),
        longitude("decimalLongitude", "Longitude")
            .required()
            .with_width(11)
            .with_dwc_id(format!("{}decimalLongitude", DWC)),
        latitude("endDecimalLatitude", "End Latitude"),
        longitude("endDecimalLongitude", "End Longitude"),
        latitude("middleDecimalLatitude", "Middle Latitude"),
        longitude("middleDecimalLongitude", "Middle Longitude"),
        // Depths
        FieldSpec::new("bottomDepthInMeters", "Bottom Depth (m)", decimal(CompareOp::Ge, 0.0))
            .inheritable()
            .required()
            .with_units("m"),
        FieldSpec::new("sampleDepthInMeters", "Sample Depth (m)", decimal(CompareOp::Ge, 0.0))
            .weak()
            .with_units("m"),
        FieldSpec::new("maximumDepthInMeters", "Maximum depth(m)", between(0.0, 9999.0))
            .inheritable()
            .with_units("m")
            .with_dwc_id(format!("{}maximumDepthInMeters", DWC)),
        FieldSpec::new("minimumDepthInMeters", "Minimum depth (m)", between(0.0, 9999.0))
            .inheritable()
            .with_width(22)
            .with_units("m")
            .with_dwc_id(format!("{}minimumDepthInMeters", DWC)),
        // Sampling
        text(GEAR_TYPE, "Gear Type").with_description("The type of gear used to retrieve the sample"),
        text(SAMPLE_TYPE, "Sample Type")
            .required()
            .with_description("The type of sample taken"),
        text(SAMPLE_LOCATION, "Sample Location")
            .required()
            .with_description("The storage location on shore"),
        text("samplingProtocol", "Sampling protocol"),
        FieldSpec::new("bottleNumber", "Bottle Number", integer(CompareOp::Gt, 0.0)),
        FieldSpec::new(
            "storageTemp",
            "Storage temp",
            list(&["neg 196 C (LN)", "neg 80 C", "neg 20 C", "Cool room", "Room temp"]),
        )
        .with_width(15),
        text("fixative", "Fixative"),
        FieldSpec::new("filter", "Filter", list(&["None", "GFF", "10 µm"])).with_width(15),
        FieldSpec::new(
            "filteredVolumeInMilliliters",
            "Filtered volume (mL)",
            decimal(CompareOp::Gt, 0.0),
        )
        .with_units("mL"),
        FieldSpec::new(
            "sampleVolumeInMilliliters",
            "Sample volume (mL)",
            decimal(CompareOp::Gt, 0.0),
        )
        .with_units("mL"),
        FieldSpec::new("dilution_factor", "Dilution factor", integer(CompareOp::Gt, 0.0)),
        FieldSpec::new(
            "water_measurement",
            "Measurement type",
            list(&[
                "deltaO18",
                "DIC (total dissolved inorganic carbon)",
                "AT (total alkalinity)",
                "pH",
                "POC/PON",
                "CDOM",
                "Trace elements",
                "TOC",
                "DOC",
                "Protists large volume",
                "Protists small volume",
                "Pigments",
                "Flow cytometry",
                "Viral concentration",
                "Viral production and decay",
            ]),
        )
        .long_list()
        .with_width(20),
        // Biology
        FieldSpec::new("individualCount", "Individual Count", integer(CompareOp::Gt, 0.0))
            .with_units("1")
            .with_dwc_id(format!("{}individualCount", DWC)),
        FieldSpec::new("sex", "Sex", list(&["Male", "Female", "Undetermined"]))
            .with_dwc_id(format!("{}sex", DWC)),
        text("scientificName", "Scientific Name")
            .with_width(20)
            .with_dwc_id(format!("{}scientificName", DWC)),
        FieldSpec::new(
            "maturationStage",
            "Maturation Stage",
            ValidationRule::NumberBetween {
                min: 0.0,
                max: 7.0,
                integer: true,
            },
        )
        .with_units("1"),
        FieldSpec::new("weightInGrams", "Weight (g)", decimal(CompareOp::Gt, 0.0)).with_units("g"),
        // Sea water properties
        measurement("seaWaterTemperatueInCelsius", "Sea Water Temp (C)", "Celsius", CompareOp::Gt, -10.0),
        measurement("seaWaterSalinity", "Sea Water Salinity (1e-3)", "1e-3", CompareOp::Ge, 0.0),
        measurement("seaWaterPressure", "Sea Water Pressure (dbar)", "dbar", CompareOp::Gt, 0.0),
        measurement("seaWaterChlorophyllA", "Sea Chl A (mg/m^3)", "mg m-3", CompareOp::Ge, 0.0),
        measurement("seaWaterTotalDIC", "Sea DIC (umol/kg)", "umol kg-1", CompareOp::Ge, 0.0),
        FieldSpec::new("seaWaterPH", "Sea Water pH (total scale)", between(-2.0, 16.0))
            .with_units("1")
            .with_format("0.0000"),
        // Remarks
        text("eventRemarks", "Event Remarks")
            .with_width(40)
            .with_dwc_id(format!("{}eventRemarks", DWC)),
        text("fieldNotes", "Field Notes").with_width(40),
        text("recordedBy", "Recorded By")
            .required()
            .with_dwc_id(format!("{}recordedBy", DWC)),
    ];

    fields.extend(metadata_fields());
    fields
}

/// Dataset-level fields expected on the metadata sheet
fn metadata_fields() -> Vec<FieldSpec> {
    vec![
        text("title", "Title").with_description("A short descriptive title of the dataset"),
        text("abstract", "Abstract")
            .with_description("Context for the dataset, sampling and analysis procedures"),
        text("pi_name", "Principal investigator (PI)").weak(),
        text("pi_email", "PI email").weak(),
        text("pi_institution", "PI institution").weak(),
        text("pi_address", "PI address").weak(),
        text("project_long", "Project long name"),
        text("project_short", "Project short name"),
        text("projectID", "Project ID").with_width(40),
    ]
}
