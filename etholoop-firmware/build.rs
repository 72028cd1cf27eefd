//! Build script for etholoop-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates rig.toml at compile time
//! - Generates `rig_config.rs` constants from it

use std::collections::BTreeMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// GPIOs on the RP2040
const PIN_COUNT: i64 = 30;
/// Host UART TX/RX
const UART_PINS: [i64; 2] = [0, 1];
/// PWM pins wired by the firmware itself
const DIMMER_PIN: i64 = 12;
const TONE_PIN: i64 = 14;
const MAX_INPUTS: usize = 10;
const MAX_OUTPUTS: usize = 10;
const MAX_MARKERS: usize = 4;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse rig.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=rig.toml");

    let config_path = Path::new("rig.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: rig.toml not found!                                      ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a rig.toml pin and timing file.           ║\n\
            ║  Please create one in the etholoop-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read rig.toml                                  ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in rig.toml                          ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with a boxed list of errors
fn fail_if_any(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn validate_config(config: &toml::Value) {
    validate_required_sections(config);
    validate_pins(config);
    validate_timing(config);
    println!("cargo:warning=rig.toml validated successfully");
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value) {
    let errors: Vec<String> = ["inputs", "outputs", "serial", "task"]
        .iter()
        .filter(|section| !matches!(config.get(**section), Some(toml::Value::Table(_))))
        .map(|section| format!("Missing [{}] section", section))
        .collect();

    fail_if_any("Missing required sections in rig.toml", &errors);
}

fn pin_list(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> Vec<i64> {
    match config.get(section).and_then(|s| s.get(key)) {
        None => Vec::new(),
        Some(toml::Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item.as_integer() {
                Some(pin) => Some(pin),
                None => {
                    errors.push(format!("[{}] {} must hold integers", section, key));
                    None
                }
            })
            .collect(),
        Some(_) => {
            errors.push(format!("[{}] {} must be an array", section, key));
            Vec::new()
        }
    }
}

fn single_pin(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
}

/// Validate pin ranges, counts and uniqueness
fn validate_pins(config: &toml::Value) {
    let mut errors = Vec::new();
    // pin -> first user
    let mut owners: BTreeMap<i64, String> = BTreeMap::new();

    let inputs = pin_list(config, "inputs", "pins", &mut errors);
    let relays = pin_list(config, "inputs", "relays", &mut errors);
    let outputs = pin_list(config, "outputs", "pins", &mut errors);
    let markers = pin_list(config, "markers", "pins", &mut errors);

    if inputs.is_empty() {
        errors.push("[inputs] pins needs at least one pin".to_string());
    }
    if inputs.len() > MAX_INPUTS {
        errors.push(format!("[inputs] at most {} pins", MAX_INPUTS));
    }
    if !relays.is_empty() && relays.len() != inputs.len() {
        errors.push("[inputs] relays must be empty or one per input".to_string());
    }
    if outputs.is_empty() {
        errors.push("[outputs] pins needs at least the reward valve".to_string());
    }
    if outputs.len() > MAX_OUTPUTS {
        errors.push(format!("[outputs] at most {} pins", MAX_OUTPUTS));
    }
    if markers.len() > MAX_MARKERS {
        errors.push(format!("[markers] at most {} pins", MAX_MARKERS));
    }

    let mut claims: Vec<(i64, String)> = Vec::new();
    claims.extend(inputs.iter().map(|&p| (p, "inputs".to_string())));
    claims.extend(relays.iter().map(|&p| (p, "relays".to_string())));
    claims.extend(outputs.iter().map(|&p| (p, "outputs".to_string())));
    claims.extend(markers.iter().map(|&p| (p, "markers".to_string())));

    if let Some(pin) = single_pin(config, "tone", "pin") {
        if pin != TONE_PIN {
            errors.push(format!("[tone] pin must be GPIO{}", TONE_PIN));
        }
        claims.push((pin, "tone".to_string()));
    }
    if let Some(pin) = single_pin(config, "dimmer", "pin") {
        if pin != DIMMER_PIN {
            errors.push(format!("[dimmer] pin must be GPIO{}", DIMMER_PIN));
        }
        claims.push((pin, "dimmer".to_string()));
    }
    if let Some(first) = single_pin(config, "strobe", "first_pin") {
        claims.extend((first..first + 9).map(|p| (p, "strobe".to_string())));
    }
    if let Some(pin) = single_pin(config, "pause", "pin") {
        claims.push((pin, "pause".to_string()));
    }

    for (pin, user) in claims {
        if !(0..PIN_COUNT).contains(&pin) {
            errors.push(format!("[{}] GPIO{} is out of range 0-29", user, pin));
            continue;
        }
        if UART_PINS.contains(&pin) {
            errors.push(format!("[{}] GPIO{} is the host UART", user, pin));
            continue;
        }
        let fixed_pwm = (pin == TONE_PIN && user != "tone") || (pin == DIMMER_PIN && user != "dimmer");
        if fixed_pwm {
            errors.push(format!("[{}] GPIO{} is reserved for PWM", user, pin));
            continue;
        }
        if let Some(owner) = owners.get(&pin) {
            errors.push(format!("[{}] GPIO{} already used by [{}]", user, pin, owner));
            continue;
        }
        owners.insert(pin, user);
    }

    fail_if_any("Invalid pin assignment in rig.toml", &errors);
}

fn int_in(config: &toml::Value, section: &str, key: &str, range: std::ops::RangeInclusive<i64>, errors: &mut Vec<String>) {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(v)) if range.contains(v) => {}
        Some(toml::Value::Integer(_)) => errors.push(format!(
            "[{}] {} must be {}-{}",
            section,
            key,
            range.start(),
            range.end()
        )),
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        None => errors.push(format!("[{}] missing '{}'", section, key)),
    }
}

fn single_char(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) {
    if let Some(value) = config.get(section).and_then(|s| s.get(key)) {
        match value.as_str() {
            Some(s) if s.len() == 1 && s.is_ascii() => {}
            _ => errors.push(format!("[{}] {} must be one ASCII character", section, key)),
        }
    }
}

/// Validate timing and framing values
fn validate_timing(config: &toml::Value) {
    let mut errors = Vec::new();
    let u32_max = i64::from(u32::MAX);

    int_in(config, "inputs", "debounce_ms", 0..=255, &mut errors);
    int_in(config, "serial", "baudrate", 1_200..=921_600, &mut errors);
    single_char(config, "serial", "eol", &mut errors);
    single_char(config, "serial", "separator", &mut errors);

    if config.get("strobe").is_some() {
        int_in(config, "strobe", "first_pin", 0..=PIN_COUNT - 9, &mut errors);
        int_in(config, "strobe", "width_us", 1..=u32_max, &mut errors);
    }
    if config.get("pause").is_some() {
        int_in(config, "pause", "cycle_ms", 1..=i64::from(u16::MAX), &mut errors);
    }
    if config.get("markers").is_some() {
        int_in(config, "markers", "pulse_ms", 1..=u32_max, &mut errors);
    }
    if config.get("monitor").is_some() {
        int_in(config, "monitor", "report_interval_ms", 1..=u32_max, &mut errors);
        int_in(config, "monitor", "warn_gap_ms", 0..=u32_max, &mut errors);
    }

    for key in ["cue_ms", "response_ms", "reward_ms", "iti_ms"] {
        int_in(config, "task", key, 0..=u32_max, &mut errors);
    }
    int_in(config, "task", "cue_hz", 20..=20_000, &mut errors);
    int_in(config, "task", "iti_dim", 0..=255, &mut errors);

    fail_if_any("Invalid timing in rig.toml", &errors);
}

fn get_int(config: &toml::Value, section: &str, key: &str, default: i64) -> i64 {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
        .unwrap_or(default)
}

fn get_bool(config: &toml::Value, section: &str, key: &str, default: bool) -> bool {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}

fn get_byte(config: &toml::Value, section: &str, key: &str, default: u8) -> u8 {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_str())
        .and_then(|s| s.bytes().next())
        .unwrap_or(default)
}

fn list(pins: &[i64]) -> String {
    pins.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ")
}

fn optional_pin(config: &toml::Value, section: &str) -> String {
    match single_pin(config, section, "pin") {
        Some(pin) => format!("Some({})", pin),
        None => "None".to_string(),
    }
}

/// Write rig_config.rs into OUT_DIR
fn generate_config(config: &toml::Value) {
    let mut ignored = Vec::new();
    let inputs = pin_list(config, "inputs", "pins", &mut ignored);
    let relays = pin_list(config, "inputs", "relays", &mut ignored);
    let outputs = pin_list(config, "outputs", "pins", &mut ignored);
    let markers = pin_list(config, "markers", "pins", &mut ignored);

    let strobe = match config.get("strobe") {
        Some(_) => format!(
            "Some(StrobeConfig {{ first_pin: {}, width_us: {}, terminator: {} }})",
            get_int(config, "strobe", "first_pin", 0),
            get_int(config, "strobe", "width_us", 5),
            get_bool(config, "strobe", "terminator", false),
        ),
        None => "None".to_string(),
    };

    let pause = match config.get("pause") {
        Some(_) => format!(
            "Some(PauseConfig {{ pin: {}, pause_when_active: {}, cycle_ms: {} }})",
            get_int(config, "pause", "pin", 0),
            get_bool(config, "pause", "pause_when_active", true),
            get_int(config, "pause", "cycle_ms", 100),
        ),
        None => "None".to_string(),
    };

    let source = format!(
        "// Generated by build.rs from rig.toml. Do not edit.\n\
         \n\
         pub const INPUT_PINS: &[u8] = &[{inputs}];\n\
         pub const RELAY_PINS: &[u8] = &[{relays}];\n\
         pub const DEBOUNCE_MS: u32 = {debounce};\n\
         pub const OUTPUT_PINS: &[u8] = &[{outputs}];\n\
         pub const MARKER_PINS: &[u8] = &[{markers}];\n\
         pub const MARKER_PULSE_MS: u32 = {marker_ms};\n\
         pub const TONE_PIN: Option<u8> = {tone};\n\
         pub const DIMMER_PIN: Option<u8> = {dimmer};\n\
         pub const STROBE: Option<StrobeConfig> = {strobe};\n\
         pub const PAUSE: Option<PauseConfig> = {pause};\n\
         pub const SERIAL: SerialConfig = SerialConfig {{ baudrate: {baud}, eol: {eol}, separator: {sep} }};\n\
         pub const MONITOR: MonitorConfig = MonitorConfig {{ enabled: {mon_on}, report_interval_ms: {mon_every}, warn_gap_ms: {mon_warn} }};\n\
         pub const TASK: TaskTiming = TaskTiming {{ cue_ms: {cue_ms}, cue_hz: {cue_hz}, response_ms: {resp}, reward_ms: {reward}, iti_ms: {iti}, iti_dim: {dim} }};\n",
        inputs = list(&inputs),
        relays = list(&relays),
        debounce = get_int(config, "inputs", "debounce_ms", 2),
        outputs = list(&outputs),
        markers = list(&markers),
        marker_ms = get_int(config, "markers", "pulse_ms", 10),
        tone = optional_pin(config, "tone"),
        dimmer = optional_pin(config, "dimmer"),
        strobe = strobe,
        pause = pause,
        baud = get_int(config, "serial", "baudrate", 115_200),
        eol = get_byte(config, "serial", "eol", b'\n'),
        sep = get_byte(config, "serial", "separator", b'\t'),
        mon_on = get_bool(config, "monitor", "enabled", true),
        mon_every = get_int(config, "monitor", "report_interval_ms", 10_000),
        mon_warn = get_int(config, "monitor", "warn_gap_ms", 2),
        cue_ms = get_int(config, "task", "cue_ms", 500),
        cue_hz = get_int(config, "task", "cue_hz", 4_000),
        resp = get_int(config, "task", "response_ms", 3_000),
        reward = get_int(config, "task", "reward_ms", 40),
        iti = get_int(config, "task", "iti_ms", 5_000),
        dim = get_int(config, "task", "iti_dim", 0),
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("rig_config.rs"), source).unwrap();
}
