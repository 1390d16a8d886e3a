use super::code::Code;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const VERB_ALARM_DISPLAY: Code = code(5);
pub const VERB_DISPLAY_DECIMAL: Code = code(6);
pub const VERB_MONITOR_DECIMAL: Code = code(16);
pub const VERB_LAMP_TEST: Code = code(35);
pub const VERB_RUN_PROGRAM: Code = code(37);
pub const VERB_PLEASE_PERFORM: Code = code(50);

pub const NOUN_NONE: Code = code(0);
pub const NOUN_ALARM_CODES: Code = code(9);
pub const NOUN_CHECKLIST_ACTION: Code = code(25);
pub const NOUN_VEL_FUEL_ALT: Code = code(62);

const fn code(value: u8) -> Code {
    match Code::new(value) {
        Some(c) => c,
        None => Code::ZERO,
    }
}

static VERB_NAMES: LazyLock<HashMap<u8, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (1, "Display Erasable Mem"),
        (3, "Display R1 Octal"),
        (4, "Display R1/R2 Octal"),
        (5, "Display R1/R2/R3 Octal"),
        (6, "Display Decimal"),
        (11, "Monitor Erasable Mem"),
        (16, "Monitor Decimal"),
        (21, "Load Component 1"),
        (22, "Load Component 2"),
        (23, "Load Component 3"),
        (33, "Proceed Without Data"),
        (34, "Terminate Program"),
        (35, "Lamp Test"),
        (37, "Run Program"),
        (46, "Select Manual Control"),
        (49, "Crew Maneuver"),
        (50, "Please Perform"),
        (69, "Restart"),
        (75, "Start Launch Control"),
        (82, "Display Orbit Info"),
        (91, "Display Checksum"),
        (99, "Confirm Burn"),
    ])
});

static NOUN_NAMES: LazyLock<HashMap<u8, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (0, "Not Applicable"),
        (1, "Specify Address"),
        (2, "Erasable Mem Addr"),
        (9, "Alarm Codes"),
        (14, "Desired Delta-V"),
        (18, "IMU Angles"),
        (23, "Burn Details"),
        (25, "Checklist Action"),
        (29, "Launch Azimuth"),
        (33, "Time to Ignition"),
        (34, "Time Next Event"),
        (35, "Time Next Event"),
        (36, "Time/Vel/Alt"),
        (38, "Time Since Boot"),
        (43, "Lat/Long/Alt"),
        (44, "Orbit Info"),
        (50, "Apo/Peri/Fuel"),
        (60, "FwdVel/AltRate/Alt"),
        (61, "Time-to-go/Crossrange"),
        (62, "Vel/Alt/DeltaH"),
        (63, "DeltaAlt/Rate/Alt"),
        (64, "LPD Time/Angle"),
        (68, "Landing Radar"),
        (69, "Restart"),
        (73, "Flight Trajectory"),
        (74, "Time/Yaw/Pitch"),
        (76, "Desired Vel/Crossrange"),
        (89, "Landing Site"),
        (94, "Orbit/Alt Info"),
        (95, "Burn Details"),
    ])
});

static PROGRAM_NAMES: LazyLock<HashMap<u8, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (0, "P00: Idle"),
        (1, "P01: Pre-Launch IMU Align"),
        (2, "P02: Pre-Launch Setup"),
        (6, "P06: Standby"),
        (11, "P11: Launch Control"),
        (12, "P12: Ascent to Orbit"),
        (15, "P15: TLI Burn"),
        (16, "P16: Lunar Orbit Insert"),
        (17, "P17: Descent Orbit Insert"),
        (18, "P18: Orbit Align"),
        (19, "P19: Orbit Adjust"),
        (32, "P32: CSI Coelliptic"),
        (33, "P33: CDH Const Delta H"),
        (34, "P34: TPI Transfer Init"),
        (35, "P35: TPM Transfer Mid"),
        (36, "P36: Rendezvous Braking"),
        (40, "P40: DPS Burn"),
        (41, "P41: RCS Burn"),
        (42, "P42: APS Burn"),
        (63, "P63: LM PDI Braking"),
        (64, "P64: LM Approach"),
        (65, "P65: LM Auto Landing"),
        (66, "P66: LM Manual Landing"),
        (68, "P68: Landing Confirm"),
        (70, "P70: LM DPS Abort"),
        (71, "P71: LM APS Abort"),
    ])
});

/// Description of a verb, `UNK` if it is not in the dictionary.
pub fn verb_name(verb: Code) -> &'static str { VERB_NAMES.get(&verb.value()).copied().unwrap_or("UNK") }

/// Description of a noun, `UNK` if it is not in the dictionary.
pub fn noun_name(noun: Code) -> &'static str { NOUN_NAMES.get(&noun.value()).copied().unwrap_or("UNK") }

pub fn program_name(program: Code) -> Option<&'static str> { PROGRAM_NAMES.get(&program.value()).copied() }
