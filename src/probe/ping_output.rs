//! Latency extraction from the textual output of the system `ping` tool.
//!
//! Supported shapes, all for a single echo request:
//!
//! ```text
//! rtt min/avg/max/mdev = 12.345/12.345/12.345/0.000 ms          (iputils)
//! round-trip min/avg/max/stddev = 12.345/12.345/12.345/0.000 ms (BSD, macOS)
//! round-trip min/avg/max = 12.345/12.345/12.345 ms              (busybox)
//! 64 bytes from 10.0.0.1: icmp_seq=1 ttl=57 time=12.3 ms         (reply line fallback)
//! ```

const SUMMARY_MARKER: &str = "min/avg/max";
const REPLY_MARKER: &str = "time=";

/// Returns the round-trip latency in milliseconds, or `None` when the output
/// carries no usable measurement.
pub fn parse_ping_latency(output: &str) -> Option<f64> {
    output
        .lines()
        .rev()
        .find(|line| line.contains(SUMMARY_MARKER))
        .and_then(parse_summary_line)
        .or_else(|| output.lines().find_map(parse_reply_line))
        .filter(|latency| latency.is_finite() && *latency >= 0.0)
}

fn parse_summary_line(line: &str) -> Option<f64> {
    let (labels, values) = line.split_once('=')?;
    let labels: Vec<&str> = labels
        .trim()
        .rsplit(' ')
        .next()?
        .split('/')
        .collect();
    let avg_index = labels.iter().position(|label| *label == "avg")?;

    let values = values.trim();
    let values = values.strip_suffix("ms").unwrap_or(values).trim();
    let fields: Vec<&str> = values.split('/').collect();
    if fields.len() != labels.len() {
        return None;
    }

    fields.get(avg_index)?.trim().parse().ok()
}

fn parse_reply_line(line: &str) -> Option<f64> {
    let start = line.find(REPLY_MARKER)? + REPLY_MARKER.len();
    let value: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    value.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IPUTILS: &str = "PING se-got-wg-001.relays.example (185.213.154.66) 56(84) bytes of data.
64 bytes from 185.213.154.66: icmp_seq=1 ttl=53 time=24.7 ms

--- se-got-wg-001.relays.example ping statistics ---
1 packets transmitted, 1 received, 0% packet loss, time 0ms
rtt min/avg/max/mdev = 24.712/24.712/24.712/0.000 ms
";

    const MACOS: &str = "PING 185.213.154.66 (185.213.154.66): 56 data bytes
64 bytes from 185.213.154.66: icmp_seq=0 ttl=53 time=31.204 ms

--- 185.213.154.66 ping statistics ---
1 packets transmitted, 1 packets received, 0.0% packet loss
round-trip min/avg/max/stddev = 31.204/31.204/31.204/0.000 ms
";

    const BUSYBOX: &str = "PING 10.0.0.1 (10.0.0.1): 56 data bytes
64 bytes from 10.0.0.1: seq=0 ttl=64 time=0.412 ms

--- 10.0.0.1 ping statistics ---
1 packets transmitted, 1 packets received, 0% packet loss
round-trip min/avg/max = 0.412/0.412/0.412 ms
";

    #[test]
    fn test_parses_iputils_summary() {
        assert_eq!(parse_ping_latency(IPUTILS), Some(24.712));
    }

    #[test]
    fn test_parses_bsd_summary() {
        assert_eq!(parse_ping_latency(MACOS), Some(31.204));
    }

    #[test]
    fn test_parses_busybox_summary() {
        assert_eq!(parse_ping_latency(BUSYBOX), Some(0.412));
    }

    #[test]
    fn test_summary_takes_avg_not_positional_field() {
        let output = "rtt min/avg/max/mdev = 10.0/20.0/30.0/5.0 ms";
        assert_eq!(parse_ping_latency(output), Some(20.0));
    }

    #[test]
    fn test_falls_back_to_reply_line() {
        let output = "64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=7.25 ms\n";
        assert_eq!(parse_ping_latency(output), Some(7.25));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_ping_latency(""), None);
        assert_eq!(parse_ping_latency("ping: unknown host"), None);
        assert_eq!(parse_ping_latency("rtt min/avg/max/mdev = a/b/c/d ms"), None);
    }

    #[test]
    fn test_rejects_mismatched_field_count() {
        assert_eq!(parse_ping_latency("rtt min/avg/max/mdev = 1.0/2.0 ms"), None);
    }

    #[test]
    fn test_rejects_non_finite_values() {
        assert_eq!(parse_ping_latency("rtt min/avg/max/mdev = nan/nan/nan/nan ms"), None);
        assert_eq!(parse_ping_latency("rtt min/avg/max/mdev = inf/inf/inf/0 ms"), None);
    }
}
