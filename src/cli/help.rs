//! Help message display for CLI.

#![allow(clippy::print_stdout)]

use crate::config::Config;

/// Print help message based on configuration state.
pub fn print_smart_help(config: &Config) {
    if needs_setup(config) {
        print_first_time_help();
    } else {
        print_configured_help();
    }
}

/// Whether no default model is configured yet.
pub fn needs_setup(config: &Config) -> bool {
    config.model.is_none()
}

/// Print detailed setup guide for first-time users.
pub fn print_first_time_help() {
    println!("No model configured. Get started with birdnetlib:");
    println!();
    println!("1. Initialize configuration:");
    println!("   birdnetlib config init");
    println!();
    println!("2. Point the [model] section at the BirdNET ONNX files:");
    println!("   path       = \"/models/BirdNET_GLOBAL_6K_V2.4_Model_FP32.onnx\"");
    println!("   labels     = \"/models/BirdNET_GLOBAL_6K_V2.4_Labels.txt\"");
    println!("   meta_model = \"/models/BirdNET_GLOBAL_6K_V2.4_MData_Model_FP16.onnx\"");
    println!();
    println!("   The meta model is only needed for --lat/--lon filtering.");
    println!();
    println!("3. Analyze audio files:");
    println!("   birdnetlib recording.wav --lat 35.4244 --lon -120.7463 --date 2022-05-10");
    println!();
    println!("Run 'birdnetlib -h' for all options.");
}

/// Print brief usage reminder for configured users.
pub fn print_configured_help() {
    println!("Usage: birdnetlib [FILES]... [OPTIONS]");
    println!();
    println!("Example: birdnetlib recording.wav --lat 35.4244 --lon -120.7463 --week 18 -c 0.25");
    println!();
    println!("Run 'birdnetlib -h' for all options or 'birdnetlib species -h' to list local species.");
}
