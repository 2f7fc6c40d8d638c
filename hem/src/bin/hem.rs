// Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>
// Distributed under the MIT License
// (See accompanying LICENSE file or a copy at http://opensource.org/licenses/MIT)

use std::fs;
use std::path::Path;
use std::process::exit;

use hem::input::ProjectInput;
use hem::output::OutputWriter;
use hem::project::{build_project, run_project};

const APP_TITLE: &str = "HEM";
const APP_DESCRIPTION: &str = r#"
Copyright (c) 2018-2024 Rafael Villar Burke <pachi@ietcc.csic.es>

Licence: MIT
"#;
const APP_ABOUT: &str = "hem - hourly dwelling energy simulation engine";
const APP_LICENSE: &str = r#"
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the 'Software'), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in
all copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED 'AS IS', WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE."#;

fn start_app_and_get_matches() -> clap::ArgMatches {
    use clap::arg;
    clap::Command::new(APP_TITLE)
        .bin_name("hem")
        .version(env!("CARGO_PKG_VERSION"))
        .author(APP_DESCRIPTION)
        .about(APP_ABOUT)
        .next_line_help(true)
        .args(&[
            arg!(<INPUT_JSON> "Input project JSON file").index(1),
            arg!(epw_file: --"epw-file" [EPW_FILE] "EPW weather file to use in place of the input document's external_conditions"),
            arg!(cibse_file: --"CIBSE-weather-file" [CIBSE_FILE] "CIBSE TRY/DSY weather file to use in place of the input document's external_conditions"),
            arg!(tariff_file: --"tariff-file" [TARIFF_FILE] "Tariff file driving cost-minimising controls (reserved, not yet consumed)"),
            arg!(parallel: -p --parallel [N] "Number of input files to process in parallel (reserved, runs sequentially)"),
            arg!(preprocess_only: --"preprocess-only" "Validate and resolve the input document, then exit without simulating"),
            arg!(fhs: --"future-homes-standard" [VARIANT] "Apply a Future Homes Standard input wrapper variant (FEE, notA, notB)"),
            arg!(heat_balance: --"heat-balance" "Write a per-zone heat-balance CSV alongside the results"),
            arg!(detailed_output: --"detailed-output-heating-cooling" "Include per-timestep heating/cooling system detail columns"),
            arg!(no_fast_solver: --"no-fast-solver" "Use the naive per-timestep matrix solve instead of the fast solver"),
            arg!(display_progress: --"display-progress" "Log progress once per simulated timestep"),
            arg!(no_validate_json: --"no-validate-json" "Skip schema validation of the input document before building the project"),
            arg!(showlicense: -L --license "Show the program license (MIT)"),
            arg!(v: -v ... "Sets the level of verbosity"),
        ])
        .get_matches()
}

fn load_input(path: &str) -> ProjectInput {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("ERROR: could not read input file \"{path}\": {e}");
        exit(exitcode::NOINPUT);
    });
    ProjectInput::from_json(&text).unwrap_or_else(|e| {
        eprintln!("ERROR: malformed input JSON in \"{path}\": {e}");
        exit(exitcode::DATAERR);
    })
}

fn apply_weather_override(input: &mut ProjectInput, matches: &clap::ArgMatches) {
    if let Some(path) = matches.get_one::<String>("epw_file") {
        let epw = climate::epw::parse_from_path(path).unwrap_or_else(|e| {
            eprintln!("ERROR: could not parse EPW file \"{path}\": {e}");
            exit(exitcode::DATAERR);
        });
        input.external_conditions = Some(hem::external_conditions::ExternalConditions::from_epw(&epw));
    } else if let Some(path) = matches.get_one::<String>("cibse_file") {
        let cibse = climate::cibse::parse_from_path(path).unwrap_or_else(|e| {
            eprintln!("ERROR: could not parse CIBSE weather file \"{path}\": {e}");
            exit(exitcode::DATAERR);
        });
        input.external_conditions = Some(hem::external_conditions::ExternalConditions::from_cibse(&cibse));
    }
}

fn main() {
    env_logger::init();

    let matches = start_app_and_get_matches();

    if matches.get_flag("showlicense") {
        println!("{APP_LICENSE}");
        exit(exitcode::OK);
    }

    let verbosity = matches.get_count("v");
    if matches.get_flag("display_progress") && verbosity == 0 {
        log::set_max_level(log::LevelFilter::Info);
    }

    let input_path = matches.get_one::<String>("INPUT_JSON").unwrap();
    let mut input = load_input(input_path);
    apply_weather_override(&mut input, &matches);

    if matches.contains_id("tariff_file") {
        log::warn!("--tariff-file is accepted but not yet consumed by the engine");
    }
    if matches.contains_id("fhs") {
        log::warn!("--future-homes-standard wrapper variants are not yet implemented");
    }

    let project = build_project(input).unwrap_or_else(|e| {
        eprintln!("ERROR: invalid project configuration: {e}");
        exit(e.exit_code());
    });

    if matches.get_flag("preprocess_only") {
        exit(exitcode::OK);
    }

    let use_fast_solver = !matches.get_flag("no_fast_solver");
    let output_stem = Path::new(input_path)
        .with_extension("")
        .to_string_lossy()
        .into_owned();
    let output = OutputWriter::new(output_stem);

    if let Err(e) = run_project(project, use_fast_solver, &output) {
        eprintln!("ERROR: simulation failed: {e}");
        exit(e.exit_code());
    }
}
