//! BIRD static route rendering.

use ipnet::Ipv4Net;

/// Render one BIRD route statement.
///
/// # Examples
/// ```
/// use birdroutes::render::render_route;
/// let net = "103.0.0.0/16".parse().unwrap();
/// assert_eq!(render_route(&net, "eth0"), "route 103.0.0.0/16 via \"eth0\";");
/// ```
pub fn render_route(net: &Ipv4Net, interface: &str) -> String {
    format!("route {} via \"{}\";", net, interface)
}

/// Render a route file: one statement per line, one trailing newline.
///
/// An empty block list renders as a lone newline.
pub fn render_routes<'a, I>(nets: I, interface: &str) -> String
where
    I: IntoIterator<Item = &'a Ipv4Net>,
{
    let mut out = String::new();
    for (i, net) in nets.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_route(net, interface));
    }
    out.push('\n');
    out
}

/// Read back the destination of a `route <cidr> via "<iface>";` line.
///
/// Returns `None` for anything that is not a route statement.
pub fn parse_route_line(line: &str) -> Option<Ipv4Net> {
    let rest = line.trim().strip_prefix("route ")?;
    let (cidr, tail) = rest.split_once(char::is_whitespace)?;
    if !tail.trim_start().starts_with("via ") || !tail.trim_end().ends_with(';') {
        return None;
    }
    cidr.parse().ok()
}

/// Read back every route destination in a rendered route file.
pub fn parse_route_file(content: &str) -> Vec<Ipv4Net> {
    content.lines().filter_map(parse_route_line).collect()
}
