// Copyright (c) 2016-2021 Rafael Villar Burke <pachi@rvburke.com>
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

/// # CIBSE TRY/DSY format reader
///
/// CIBSE Test Reference Year / Design Summer Year files: a one-line header
/// naming the site plus latitude/longitude, then 8760 comma-separated hourly
/// rows (month, day, hour, dry-bulb temp, wind speed, wind direction, global
/// horizontal radiation, diffuse horizontal radiation).
use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Error};

#[derive(Debug, Clone, Default)]
pub struct CibseMeta {
    pub site_name: String,
    pub latitude: f32,
    pub longitude: f32,
}

#[derive(Debug, Clone, Default)]
pub struct CibseHourlyData {
    pub month: u32,
    pub day: u32,
    pub hour: f32,
    pub dry_bulb_temp: f32,
    pub wind_speed: f32,
    pub wind_direction: f32,
    pub global_horizontal_radiation: f32,
    pub diffuse_horizontal_radiation: f32,
}

#[derive(Debug, Clone, Default)]
pub struct CibseData {
    pub meta: CibseMeta,
    pub data: Vec<CibseHourlyData>,
}

pub fn parse_cibse<S: AsRef<str>>(csvstring: S) -> Result<CibseData, Error> {
    let lines: Vec<&str> = csvstring
        .as_ref()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() < 2 {
        bail!("CIBSE weather file too short to contain a header and hourly data");
    }
    let header_fields: Vec<&str> = lines[0].split(',').collect();
    if header_fields.len() < 3 {
        bail!("malformed CIBSE site header: {}", lines[0]);
    }
    let meta = CibseMeta {
        site_name: header_fields[0].to_string(),
        latitude: header_fields[1].parse()?,
        longitude: header_fields[2].parse()?,
    };

    let data: Vec<CibseHourlyData> = lines[1..]
        .iter()
        .map(|line| {
            let f: Vec<&str> = line.split(',').map(str::trim).collect();
            if f.len() < 8 {
                bail!("CIBSE data row has fewer than 8 fields: {}", line);
            }
            Ok(CibseHourlyData {
                month: f[0].parse()?,
                day: f[1].parse()?,
                hour: f[2].parse()?,
                dry_bulb_temp: f[3].parse()?,
                wind_speed: f[4].parse()?,
                wind_direction: f[5].parse()?,
                global_horizontal_radiation: f[6].parse()?,
                diffuse_horizontal_radiation: f[7].parse()?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    if data.len() != 8760 {
        bail!(
            "CIBSE weather file has {} hourly rows, expected 8760",
            data.len()
        );
    }

    Ok(CibseData { meta, data })
}

pub fn parse_from_path<T: AsRef<Path>>(path: T) -> Result<CibseData, Error> {
    let mut utf8data = String::new();
    BufReader::new(File::open(path.as_ref())?)
        .read_to_string(&mut utf8data)
        .with_context(|| format!("could not read CIBSE weather file {}", path.as_ref().display()))?;
    parse_cibse(&utf8data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_site_header() {
        let header = "London Weather Centre,51.5,-0.1\n";
        let mut body = header.to_string();
        for _ in 0..10 {
            body.push_str("1,1,1,10.0,3.0,180,0,0\n");
        }
        let err = parse_cibse(&body).unwrap_err();
        assert!(err.to_string().contains("expected 8760"));
    }

    #[test]
    fn rejects_malformed_header() {
        assert!(parse_cibse("onlyonefield\n1,1,1,1,1,1,1,1\n").is_err());
    }
}
