//! Command-line `key=value` parsing
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use transloadit_client::UrlParam;

/// Split `name=value`; the value may be empty, the name may not
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{}`", raw))?;

    if name.is_empty() {
        return Err(format!("empty name in `{}`", raw));
    }

    Ok((name.to_string(), value.to_string()))
}

/// Repeated names collapse into one list parameter, in command-line order
pub fn group_url_params(raw: &[String]) -> Result<Vec<(String, UrlParam)>, String> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();

    for item in raw {
        let (name, value) = parse_pair(item)?;
        match grouped.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => grouped.push((name, vec![value])),
        }
    }

    Ok(grouped
        .into_iter()
        .map(|(name, mut values)| {
            let param = if values.len() == 1 {
                UrlParam::from(values.remove(0))
            } else {
                UrlParam::from(values)
            };
            (name, param)
        })
        .collect())
}
