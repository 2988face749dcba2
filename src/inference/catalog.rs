//! Model catalog: feature order, categorical vocabularies, and sample inputs.
use crate::error::WorkflowError;
use crate::record::ModelKind;
use serde_json::{json, Map, Value};

/// A deployable model and the feature order it expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub file: &'static str,
    pub features: &'static [&'static str],
}

pub static MODELS: [ModelSpec; 6] = [
    ModelSpec {
        kind: ModelKind::Weather,
        file: "models/model_weather.pkl",
        features: &[
            "Temperature_C",
            "Humidity_Percent",
            "Rainfall_mm",
            "Wind_Speed_mps",
            "Wind_Direction_deg",
            "Visibility_km",
            "Pressure_hPa",
            "Sea_State_Level",
            "Wave_Height_m",
            "Tide_Level_m",
            "Storm_Warning",
            "Weather_Condition",
        ],
    },
    ModelSpec {
        kind: ModelKind::Road,
        file: "models/model_road.pkl",
        features: &[
            "Surface_Type",
            "Surface_Condition",
            "Pothole_Density",
            "Slope_Angle_Degrees",
            "Traffic_Density",
            "Flood_Level_m",
            "Access_Status",
            "Dust_Level_PPM",
            "Ground_Vibration_mm_s",
            "Road_Temperature_C",
            "Rainfall_mm",
            "Soil_Moisture_%",
            "Maintenance_Activity",
            "Accident_Count",
        ],
    },
    ModelSpec {
        kind: ModelKind::Equipment,
        file: "models/model_equipment.pkl",
        features: &[
            "Machine_Type",
            "Engine_Temperature_C",
            "Oil_Pressure_Bar",
            "Fuel_Level_Percent",
            "Engine_RPM",
            "Vibration_Level_g",
            "Hydraulic_Pressure_Bar",
            "Working_Hours",
            "Maintenance_Status",
            "Fault_Code",
            "Operational_Mode",
            "Ambient_Temperature_C",
            "Gear_Position",
            "Fuel_Consumption_L_h",
            "Torque_Nm",
            "Engine_Load_Percent",
        ],
    },
    ModelSpec {
        kind: ModelKind::Vessel,
        file: "models/model_vessel.pkl",
        features: &[
            "Delay_Minutes",
            "Cargo_Type",
            "Load_Weight_Tons",
            "Port_Condition",
            "Weather_Impact_Score",
            "Sea_Condition_Code",
            "Crew_Availability_Percent",
            "Vessel_Status",
            "Fuel_Consumption_Tons",
            "Engine_RPM",
            "Distance_Traveled_km",
            "Average_Speed_knots",
            "Departure_Hour",
            "Departure_Weekday",
            "Departure_Month",
            "Planned_Duration_hours",
        ],
    },
    ModelSpec {
        kind: ModelKind::Logistics,
        file: "models/model_logistics.pkl",
        features: &[
            "Date",
            "Route_Code",
            "Origin_Location",
            "Destination_Location",
            "Cargo_Type",
            "Cargo_Weight_Tons",
            "Transport_Mode",
            "Distance_km",
            "Travel_Time_hr",
            "Actual_Travel_Time_hr",
            "Fuel_Used_Liters",
            "Fuel_Cost_USD",
            "Delivery_Status",
            "Delay_Cause",
            "CO2_Emission_kg",
        ],
    },
    ModelSpec {
        kind: ModelKind::Production,
        file: "models/model_production.pkl",
        features: &[
            "Record_Timestamp",
            "Production_ID",
            "Date",
            "Machine_ID",
            "Shift",
            "Operator_ID",
            "Material_Type",
            "Working_Hours",
            "Production_Tons",
            "Fuel_Consumed_Liters",
            "Downtime_Minutes",
            "Weather_Condition",
            "Road_Condition_Status",
            "Equipment_Efficiency_Percent",
            "Fuel_Efficiency_Tons_per_Liter",
            "Incident_Report",
            "Maintenance_Required",
            "CO2_Emission_kg",
            "Production_Cost_USD",
            "Revenue_USD",
        ],
    },
];

/// Fixed vocabularies for categorical features, in canonical spelling.
static CATEGORIES: [(&str, &[&str]); 15] = [
    ("Weather_Condition", &["Clear", "Rainy", "Storm"]),
    ("Surface_Type", &["Asphalt", "Dirt", "Gravel"]),
    ("Surface_Condition", &["Dry", "Wet", "Slippery"]),
    ("Access_Status", &["Open", "Closed", "Restricted"]),
    ("Machine_Type", &["Excavator", "Dump Truck", "Bulldozer"]),
    ("Maintenance_Status", &["OK", "Service Required", "Fault"]),
    ("Operational_Mode", &["Idle", "Active", "Travel"]),
    ("Port_Condition", &["Normal", "Busy", "Closed"]),
    ("Sea_Condition_Code", &["Calm", "Moderate", "Rough"]),
    ("Transport_Mode", &["Truck", "Train", "Vessel"]),
    ("Delivery_Status", &["Completed", "Delayed", "In Transit"]),
    ("Delay_Cause", &["Weather", "Traffic", "Mechanical"]),
    ("Shift", &["Morning", "Afternoon", "Night"]),
    ("Road_Condition_Status", &["Good", "Moderate", "Bad"]),
    ("Material_Type", &["Coal", "Nickel", "Iron Ore"]),
];

pub fn model_spec(kind: ModelKind) -> &'static ModelSpec {
    MODELS
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or(&MODELS[0])
}

/// Look up a model by name.
pub fn lookup(name: &str) -> Result<&'static ModelSpec, WorkflowError> {
    ModelKind::parse(name)
        .map(model_spec)
        .ok_or_else(|| WorkflowError::ModelNotFound(name.to_string()))
}

/// Vocabulary for a categorical feature, `None` for numeric features.
pub fn categories(feature: &str) -> Option<&'static [&'static str]> {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == feature)
        .map(|(_, values)| *values)
}

/// Built-in sample inputs for smoke-testing a model end to end.
pub fn sample_inputs(kind: ModelKind) -> Map<String, Value> {
    let sample = match kind {
        ModelKind::Weather => json!({
            "Temperature_C": 30.5, "Humidity_Percent": 78, "Rainfall_mm": 5.2,
            "Wind_Speed_mps": 3.4, "Wind_Direction_deg": 120, "Visibility_km": 8.5,
            "Pressure_hPa": 1010, "Sea_State_Level": 2, "Wave_Height_m": 1.2,
            "Tide_Level_m": 0.6, "Storm_Warning": 0, "Weather_Condition": "Clear"
        }),
        ModelKind::Road => json!({
            "Surface_Type": "Asphalt", "Surface_Condition": "Wet", "Pothole_Density": 0.3,
            "Slope_Angle_Degrees": 5, "Traffic_Density": 0.7, "Flood_Level_m": 0.1,
            "Access_Status": "Open", "Dust_Level_PPM": 45, "Ground_Vibration_mm_s": 2.1,
            "Road_Temperature_C": 35, "Rainfall_mm": 4.5, "Soil_Moisture_%": 35,
            "Maintenance_Activity": "None", "Accident_Count": 1
        }),
        ModelKind::Equipment => json!({
            "Machine_Type": "Excavator", "Engine_Temperature_C": 82, "Oil_Pressure_Bar": 4.2,
            "Fuel_Level_Percent": 65, "Engine_RPM": 1800, "Vibration_Level_g": 0.8,
            "Hydraulic_Pressure_Bar": 210, "Working_Hours": 6.5, "Maintenance_Status": "OK",
            "Fault_Code": 0, "Operational_Mode": "Active", "Ambient_Temperature_C": 32,
            "Gear_Position": "3", "Fuel_Consumption_L_h": 12.5, "Torque_Nm": 450,
            "Engine_Load_Percent": 78
        }),
        ModelKind::Vessel => json!({
            "Delay_Minutes": 15, "Cargo_Type": "Coal", "Load_Weight_Tons": 1200,
            "Port_Condition": "Normal", "Weather_Impact_Score": 0.6,
            "Sea_Condition_Code": "Moderate", "Crew_Availability_Percent": 95,
            "Vessel_Status": "Departed", "Fuel_Consumption_Tons": 20.5, "Engine_RPM": 1600,
            "Distance_Traveled_km": 320, "Average_Speed_knots": 14, "Departure_Hour": 8,
            "Departure_Weekday": 3, "Departure_Month": 11, "Planned_Duration_hours": 10
        }),
        ModelKind::Logistics => json!({
            "Date": "2025-11-11", "Route_Code": "R123", "Origin_Location": "Pontianak",
            "Destination_Location": "Balikpapan", "Cargo_Type": "Fuel", "Cargo_Weight_Tons": 35,
            "Transport_Mode": "Truck", "Distance_km": 470, "Travel_Time_hr": 9.5,
            "Actual_Travel_Time_hr": 10.2, "Fuel_Used_Liters": 220, "Fuel_Cost_USD": 180,
            "Delivery_Status": "Completed", "Delay_Cause": "Traffic", "CO2_Emission_kg": 75
        }),
        ModelKind::Production => json!({
            "Record_Timestamp": "2025-11-11 10:00:00", "Production_ID": "PRD_091",
            "Date": "2025-11-11", "Machine_ID": "MCH_07", "Shift": "Morning",
            "Operator_ID": "OP_12", "Material_Type": "Iron Ore", "Working_Hours": 8,
            "Production_Tons": 420, "Fuel_Consumed_Liters": 140, "Downtime_Minutes": 25,
            "Weather_Condition": "Sunny", "Road_Condition_Status": "Good",
            "Equipment_Efficiency_Percent": 88, "Fuel_Efficiency_Tons_per_Liter": 3.0,
            "Incident_Report": 0, "Maintenance_Required": 0, "CO2_Emission_kg": 65,
            "Production_Cost_USD": 21000, "Revenue_USD": 28000
        }),
    };
    match sample {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
