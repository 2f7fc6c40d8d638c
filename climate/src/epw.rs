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

/// # EPW format reader
///
/// EnergyPlus Weather (.epw) files: one `LOCATION` header line, seven more
/// header lines (unused here), then 8760 comma-separated hourly data rows.
/// Only the fields this crate's callers need are kept: dry-bulb temperature,
/// wind speed and direction, direct normal and diffuse horizontal radiation.
use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Error};

#[derive(Debug, Clone, Default)]
pub struct EpwMeta {
    pub station_name: String,
    pub latitude: f32,
    pub longitude: f32,
    pub tz: f32,
    pub altitude: f32,
}

#[derive(Debug, Clone, Default)]
pub struct EpwHourlyData {
    pub month: u32,
    pub day: u32,
    pub hour: f32,
    pub dry_bulb_temp: f32,
    pub wind_speed: f32,
    pub wind_direction: f32,
    pub direct_normal_radiation: f32,
    pub diffuse_horizontal_radiation: f32,
}

#[derive(Debug, Clone, Default)]
pub struct EpwData {
    pub meta: EpwMeta,
    pub data: Vec<EpwHourlyData>,
}

/// Parses the `LOCATION` header line: `LOCATION,name,state,country,source,wmo,lat,lon,tz,elev`.
fn parse_location(line: &str) -> Result<EpwMeta, Error> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 10 || fields[0] != "LOCATION" {
        bail!("malformed EPW LOCATION header: {}", line);
    }
    Ok(EpwMeta {
        station_name: fields[1].to_string(),
        latitude: fields[6].parse()?,
        longitude: fields[7].parse()?,
        tz: fields[8].parse()?,
        altitude: fields[9].parse()?,
    })
}

pub fn parse_epw<S: AsRef<str>>(epwstring: S) -> Result<EpwData, Error> {
    let lines: Vec<&str> = epwstring.as_ref().lines().collect();
    if lines.len() < 9 {
        bail!("EPW file too short to contain a header and hourly data");
    }
    let meta = parse_location(lines[0])?;

    let data: Vec<EpwHourlyData> = lines[8..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|line| {
            let f: Vec<&str> = line.split(',').collect();
            if f.len() < 22 {
                bail!("EPW data row has fewer than 22 fields: {}", line);
            }
            Ok(EpwHourlyData {
                month: f[1].parse()?,
                day: f[2].parse()?,
                hour: f[3].parse::<f32>()? - 1.0,
                dry_bulb_temp: f[6].parse()?,
                wind_direction: f[20].parse()?,
                wind_speed: f[21].parse()?,
                direct_normal_radiation: f[14].parse()?,
                diffuse_horizontal_radiation: f[15].parse()?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    if data.len() != 8760 {
        bail!(
            "EPW file has {} hourly rows, expected 8760",
            data.len()
        );
    }

    Ok(EpwData { meta, data })
}

pub fn parse_from_path<T: AsRef<Path>>(path: T) -> Result<EpwData, Error> {
    let mut utf8data = String::new();
    BufReader::new(File::open(path.as_ref())?)
        .read_to_string(&mut utf8data)
        .with_context(|| format!("could not read EPW file {}", path.as_ref().display()))?;
    parse_epw(&utf8data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(month: u32, day: u32, hour: u32) -> String {
        format!(
            "{month},{day},{hour},0,0,0,12.0,10.0,80000,0,0,0,0,0,100,50,5.5,180,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0"
        )
    }

    #[test]
    fn parses_location_header() {
        let header = "LOCATION,LONDON GATWICK,GBR,GBR,SRC,037760,51.15,-0.18,0.0,62.0";
        let meta = parse_location(header).unwrap();
        assert_eq!(meta.station_name, "LONDON GATWICK");
        assert!((meta.latitude - 51.15).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_row_count() {
        let mut body = "LOCATION,X,GBR,GBR,SRC,0,51.0,0.0,0.0,0.0\n".to_string();
        for _ in 0..7 {
            body.push_str("DUMMY\n");
        }
        body.push_str(&sample_row(1, 1, 1));
        assert!(parse_epw(&body).is_err());
    }
}
