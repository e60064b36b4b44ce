//! Bakes the node's network settings from `.env` into the binary.

const EXPORTED: [&str; 5] = [
    "AQNODE_WIFI_SSID",
    "AQNODE_WIFI_PASSWORD",
    "AQNODE_COLLECTOR_URL",
    "AQNODE_PM_UNIT",
    "AQNODE_TEMPERATURE_UNIT",
];

fn main() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    println!("cargo:rerun-if-changed=.env");
    match dotenvy::dotenv() {
        Ok(path) => println!("cargo:warning=loaded {}", path.display()),
        Err(e) if e.not_found() => {
            println!("cargo:warning=no .env found; telemetry upload disabled unless set in the environment")
        }
        Err(e) => panic!("failed to read .env: {e}"),
    }

    for key in EXPORTED {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }
}
