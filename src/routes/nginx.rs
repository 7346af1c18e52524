//! Nginx `location` block rendering.
//!
//! The output is meant to be `include`d inside a `server { }` block of the
//! proxy's main configuration.

use std::fmt::Write;

use crate::managed::error::RenderError;
use crate::managed::render::Renderer;
use crate::routes::Route;

const HEADER: &str = "# Dynamic routes - auto-generated, do not edit\n# Managed by forge-confd\n\n";

/// Forwarded on every route.
const PROXY_HEADERS: &[&str] = &[
    "proxy_http_version 1.1;",
    "proxy_set_header Host $host;",
    "proxy_set_header X-Real-IP $remote_addr;",
    "proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;",
    "proxy_set_header X-Forwarded-Proto $scheme;",
    "proxy_set_header Upgrade $http_upgrade;",
    "proxy_set_header Connection \"upgrade\";",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct NginxRenderer;

impl NginxRenderer {
    /// `proxy_pass` with a URI part replaces the matched prefix, without one
    /// the full request path is passed through.
    fn proxy_target(route: &Route) -> String {
        if route.strip_prefix {
            if route.target.ends_with('/') {
                route.target.clone()
            } else {
                format!("{}/", route.target)
            }
        } else {
            route.target.trim_end_matches('/').to_string()
        }
    }
}

impl Renderer<Route> for NginxRenderer {
    fn render(&self, routes: &[Route]) -> Result<String, RenderError> {
        let mut out = String::from(HEADER);

        for route in routes {
            if !route.path.starts_with('/') || !route.path.ends_with('/') {
                return Err(RenderError::Invariant(format!(
                    "route {} has unnormalized path {}",
                    route.name, route.path
                )));
            }

            // Writing to a String cannot fail.
            let _ = writeln!(out, "# Route: {}", route.name);
            let _ = writeln!(out, "location {} {{", route.path);
            let _ = writeln!(out, "    proxy_pass {};", Self::proxy_target(route));
            for header in PROXY_HEADERS {
                let _ = writeln!(out, "    {}", header);
            }
            out.push_str("}\n\n");
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, target: &str, strip_prefix: bool) -> Route {
        Route {
            name: name.into(),
            path: format!("/{}/", name),
            target: target.into(),
            strip_prefix,
        }
    }

    #[test]
    fn test_empty_has_header_only() {
        let out = NginxRenderer.render(&[]).unwrap();
        assert_eq!(out, HEADER);
    }

    #[test]
    fn test_strip_prefix_adds_slash() {
        let out = NginxRenderer.render(&[route("blog", "http://blog:8000", true)]).unwrap();
        assert!(out.contains("# Route: blog\n"));
        assert!(out.contains("location /blog/ {\n    proxy_pass http://blog:8000/;\n"));
        assert!(out.contains("    proxy_set_header Connection \"upgrade\";\n}\n"));
    }

    #[test]
    fn test_keep_prefix_trims_slash() {
        let out = NginxRenderer.render(&[route("api", "http://api:9000/", false)]).unwrap();
        assert!(out.contains("    proxy_pass http://api:9000;\n"));
    }

    #[test]
    fn test_unnormalized_path_is_invariant_violation() {
        let mut r = route("x", "http://x", false);
        r.path = "x".into();
        assert!(matches!(
            NginxRenderer.render(&[r]),
            Err(RenderError::Invariant(_))
        ));
    }

    #[test]
    fn test_blocks_in_given_order() {
        let out = NginxRenderer
            .render(&[route("a", "http://a", false), route("b", "http://b", false)])
            .unwrap();
        let a = out.find("# Route: a").unwrap();
        let b = out.find("# Route: b").unwrap();
        assert!(a < b);
    }
}
