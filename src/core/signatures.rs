//! Static, read-only signature tables.
//!
//! Every detectable CDN, CMS, technology and hosting provider is a data record
//! matched generically by the aggregator. Supporting a new provider means adding
//! a row here. Declaration order is significant: it breaks CDN score ties and
//! decides which CMS wins when several would match.

use once_cell::sync::Lazy;
use regex::Regex;

// --- CDN ---

pub struct CdnSignature {
    pub name: &'static str,
    /// Matched as case-insensitive substrings of response header names.
    pub headers: &'static [&'static str],
    /// Searched in the lower-cased CNAME target.
    pub cname: &'static Lazy<Regex>,
}

static RE_CNAME_CLOUDFLARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.cloudflare\.").unwrap());
static RE_CNAME_CLOUDFRONT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.cloudfront\.net").unwrap());
static RE_CNAME_FASTLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.fastly\.").unwrap());
static RE_CNAME_AKAMAI: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.akamai\.|\.edgesuite\.|\.edgekey\.").unwrap());
static RE_CNAME_AZURE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.azureedge\.|\.azurefd\.").unwrap());
static RE_CNAME_GOOGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.googleusercontent\.").unwrap());
static RE_CNAME_KEYCDN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.kxcdn\.").unwrap());
static RE_CNAME_BUNNY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.b-cdn\.").unwrap());
static RE_CNAME_SUCURI: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.sucuri\.net").unwrap());
static RE_CNAME_INCAPSULA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.incapdns\.net").unwrap());
static RE_CNAME_STACKPATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.stackpathdns\.com|\.stackpathcdn\.").unwrap());
static RE_CNAME_VERCEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.vercel-dns\.com|\.vercel\.app").unwrap());
static RE_CNAME_NETLIFY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.netlify\.(app|com)").unwrap());

pub static CDN_SIGNATURES: &[CdnSignature] = &[
    CdnSignature { name: "CloudFlare", headers: &["cf-ray", "cf-cache-status"], cname: &RE_CNAME_CLOUDFLARE },
    CdnSignature { name: "Amazon CloudFront", headers: &["x-amz-cf-id"], cname: &RE_CNAME_CLOUDFRONT },
    CdnSignature { name: "Fastly", headers: &["fastly-debug-digest", "x-served-by"], cname: &RE_CNAME_FASTLY },
    CdnSignature { name: "Akamai", headers: &["x-akamai-edgescape"], cname: &RE_CNAME_AKAMAI },
    CdnSignature { name: "Azure CDN", headers: &["x-azure-ref"], cname: &RE_CNAME_AZURE },
    CdnSignature { name: "Google Cloud CDN", headers: &["x-goog-generation"], cname: &RE_CNAME_GOOGLE },
    CdnSignature { name: "KeyCDN", headers: &["x-edge-location"], cname: &RE_CNAME_KEYCDN },
    CdnSignature { name: "BunnyCDN", headers: &["cdn-pullzone"], cname: &RE_CNAME_BUNNY },
    CdnSignature { name: "Sucuri", headers: &["x-sucuri-id", "x-sucuri-cache"], cname: &RE_CNAME_SUCURI },
    CdnSignature { name: "Imperva Incapsula", headers: &["x-iinfo"], cname: &RE_CNAME_INCAPSULA },
    CdnSignature { name: "StackPath", headers: &["x-sp-cache-status"], cname: &RE_CNAME_STACKPATH },
    CdnSignature { name: "Vercel", headers: &["x-vercel-id", "x-vercel-cache"], cname: &RE_CNAME_VERCEL },
    CdnSignature { name: "Netlify", headers: &["x-nf-request-id"], cname: &RE_CNAME_NETLIFY },
];

// --- CMS ---

pub struct CmsSignature {
    pub name: &'static str,
    /// Exact header names (case-insensitive).
    pub headers: &'static [&'static str],
    /// Applied to the value of the matched header; capture 1 is the version.
    pub header_version: Option<&'static Lazy<Regex>>,
    /// Substrings of the `Set-Cookie` value.
    pub cookies: &'static [&'static str],
    /// Applied to the HTML prefix; capture 1, when present, is the version.
    pub meta: Option<&'static Lazy<Regex>>,
    /// Substrings of the HTML prefix.
    pub paths: &'static [&'static str],
}

static RE_META_WORDPRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']WordPress\s*([\d.]+)?"#).unwrap()
});
static RE_HEADER_DRUPAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Drupal\s*(\d+(?:\.\d+)*)").unwrap());
static RE_META_DRUPAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']Drupal\s*(\d+(?:\.\d+)*)?"#).unwrap()
});
static RE_META_JOOMLA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']Joomla!?\s*([\d.]+)?"#).unwrap()
});
static RE_META_GHOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']Ghost\s*([\d.]+)?"#).unwrap()
});
static RE_META_WIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']Wix\.com Website Builder"#).unwrap()
});
static RE_META_WEBFLOW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']Webflow"#).unwrap()
});
static RE_META_HUGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+name=["']generator["'][^>]+content=["']Hugo\s*([\d.]+)?"#).unwrap()
});

pub static CMS_SIGNATURES: &[CmsSignature] = &[
    CmsSignature {
        name: "WordPress",
        headers: &["x-pingback"],
        header_version: None,
        cookies: &["wordpress_", "wp-settings"],
        meta: Some(&RE_META_WORDPRESS),
        paths: &["/wp-content/", "/wp-includes/"],
    },
    CmsSignature {
        name: "Drupal",
        headers: &["x-drupal-cache", "x-drupal-dynamic-cache"],
        header_version: Some(&RE_HEADER_DRUPAL),
        cookies: &[],
        meta: Some(&RE_META_DRUPAL),
        paths: &["/sites/default/files/", "/core/misc/drupal.js", "drupal-settings-json"],
    },
    CmsSignature {
        name: "Joomla",
        headers: &[],
        header_version: None,
        cookies: &[],
        meta: Some(&RE_META_JOOMLA),
        paths: &["/media/jui/", "/media/system/js/core.js", "/components/com_"],
    },
    CmsSignature {
        name: "Shopify",
        headers: &["x-shopid", "x-shopify-stage"],
        header_version: None,
        cookies: &["_shopify_"],
        meta: None,
        paths: &["cdn.shopify.com"],
    },
    CmsSignature {
        name: "Magento",
        headers: &["x-magento-cache-debug", "x-magento-tags"],
        header_version: None,
        cookies: &["mage-cache", "frontend="],
        meta: None,
        paths: &["/static/version", "Mage.Cookies", "mage/cookies"],
    },
    CmsSignature {
        name: "Ghost",
        headers: &["x-ghost-cache-status"],
        header_version: None,
        cookies: &[],
        meta: Some(&RE_META_GHOST),
        paths: &["/ghost/api/", "ghost-portal"],
    },
    CmsSignature {
        name: "Squarespace",
        headers: &[],
        header_version: None,
        cookies: &["SS_MID", "crumb="],
        meta: None,
        paths: &["static1.squarespace.com", "squarespace-cdn.com"],
    },
    CmsSignature {
        name: "Wix",
        headers: &["x-wix-request-id"],
        header_version: None,
        cookies: &[],
        meta: Some(&RE_META_WIX),
        paths: &["static.wixstatic.com"],
    },
    CmsSignature {
        name: "Webflow",
        headers: &[],
        header_version: None,
        cookies: &[],
        meta: Some(&RE_META_WEBFLOW),
        paths: &["assets.website-files.com"],
    },
    CmsSignature {
        name: "Hugo",
        headers: &[],
        header_version: None,
        cookies: &[],
        meta: Some(&RE_META_HUGO),
        paths: &[],
    },
];

// --- Security headers ---

pub struct SecurityHeader {
    /// Canonical header name, used for matching and display.
    pub name: &'static str,
    pub points: u32,
}

/// Point values sum to 100.
pub static SECURITY_HEADERS: &[SecurityHeader] = &[
    SecurityHeader { name: "Strict-Transport-Security", points: 20 },
    SecurityHeader { name: "Content-Security-Policy", points: 20 },
    SecurityHeader { name: "X-Frame-Options", points: 15 },
    SecurityHeader { name: "X-Content-Type-Options", points: 15 },
    SecurityHeader { name: "X-XSS-Protection", points: 10 },
    SecurityHeader { name: "Referrer-Policy", points: 10 },
    SecurityHeader { name: "Permissions-Policy", points: 10 },
];

// --- Technologies ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechCategory {
    Language,
    Framework,
    Analytics,
}

/// Where a technology pattern is looked for.
pub enum Check {
    /// Pattern in the value of a specific header.
    Header(&'static str, &'static Lazy<Regex>),
    /// Pattern anywhere in the HTML prefix.
    Html(&'static Lazy<Regex>),
    /// Substring of the `Set-Cookie` value.
    Cookie(&'static str),
    /// Pattern in the `src` of a `<script>` tag.
    ScriptSrc(&'static Lazy<Regex>),
}

pub struct TechnologySignature {
    pub name: &'static str,
    pub category: TechCategory,
    pub check: Check,
}

static RE_PHP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bphp\b").unwrap());
static RE_ASPNET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)asp\.net").unwrap());
static RE_ANY: Lazy<Regex> = Lazy::new(|| Regex::new(r".").unwrap());
static RE_EXPRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)express").unwrap());
static RE_SERVLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)servlet|jsp").unwrap());
static RE_PYTHON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)python|gunicorn|uvicorn|django|flask").unwrap());
static RE_RUBY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)phusion passenger|\bruby\b|puma").unwrap());
static RE_REACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\breact(?:-dom)?\b|__react|data-reactroot").unwrap());
static RE_ANGULAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)ng-version|\bangular\b").unwrap());
static RE_VUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"data-v-app|__VUE_|\bvue(?:\.min)?\.js").unwrap());
static RE_NEXTJS: Lazy<Regex> = Lazy::new(|| Regex::new(r"/_next/static/|__NEXT_DATA__").unwrap());
static RE_NEXTJS_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)next\.js").unwrap());
static RE_NUXTJS: Lazy<Regex> = Lazy::new(|| Regex::new(r"__NUXT__|/_nuxt/").unwrap());
static RE_SVELTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"class=["'][^"']*svelte-|__sveltekit"#).unwrap());
static RE_GATSBY: Lazy<Regex> = Lazy::new(|| Regex::new(r#"id=["']___gatsby["']"#).unwrap());
static RE_JQUERY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)jquery(?:[.-][\d.]+)?(?:\.min)?\.js").unwrap());
static RE_BOOTSTRAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)bootstrap(?:\.min)?\.(?:css|js)").unwrap());
static RE_TAILWIND: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)tailwind(?:css)?").unwrap());
static RE_GOOGLE_ANALYTICS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"google-analytics\.com/(?:ga|analytics)\.js|googletagmanager\.com/gtag/js").unwrap()
});
static RE_GTM: Lazy<Regex> = Lazy::new(|| Regex::new(r"googletagmanager\.com/gtm\.js|GTM-[A-Z0-9]+").unwrap());
static RE_FB_PIXEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"connect\.facebook\.net/[^/]+/fbevents\.js").unwrap());
static RE_HOTJAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"static\.hotjar\.com").unwrap());
static RE_PLAUSIBLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"plausible\.io/js/").unwrap());
static RE_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"cdn\.segment\.com/analytics\.js").unwrap());

pub static TECHNOLOGY_SIGNATURES: &[TechnologySignature] = &[
    // Languages
    TechnologySignature { name: "PHP", category: TechCategory::Language, check: Check::Header("x-powered-by", &RE_PHP) },
    TechnologySignature { name: "PHP", category: TechCategory::Language, check: Check::Cookie("PHPSESSID") },
    TechnologySignature { name: "ASP.NET", category: TechCategory::Language, check: Check::Header("x-powered-by", &RE_ASPNET) },
    TechnologySignature { name: "ASP.NET", category: TechCategory::Language, check: Check::Header("x-aspnet-version", &RE_ANY) },
    TechnologySignature { name: "ASP.NET", category: TechCategory::Language, check: Check::Cookie("ASP.NET_SessionId") },
    TechnologySignature { name: "Java", category: TechCategory::Language, check: Check::Header("x-powered-by", &RE_SERVLET) },
    TechnologySignature { name: "Java", category: TechCategory::Language, check: Check::Cookie("JSESSIONID") },
    TechnologySignature { name: "Node.js", category: TechCategory::Language, check: Check::Header("x-powered-by", &RE_EXPRESS) },
    TechnologySignature { name: "Python", category: TechCategory::Language, check: Check::Header("server", &RE_PYTHON) },
    TechnologySignature { name: "Python", category: TechCategory::Language, check: Check::Cookie("csrftoken") },
    TechnologySignature { name: "Ruby", category: TechCategory::Language, check: Check::Header("server", &RE_RUBY) },
    TechnologySignature { name: "Ruby", category: TechCategory::Language, check: Check::Cookie("_rails_session") },
    // Frameworks
    TechnologySignature { name: "React", category: TechCategory::Framework, check: Check::Html(&RE_REACT) },
    TechnologySignature { name: "Angular", category: TechCategory::Framework, check: Check::Html(&RE_ANGULAR) },
    TechnologySignature { name: "Vue.js", category: TechCategory::Framework, check: Check::Html(&RE_VUE) },
    TechnologySignature { name: "Next.js", category: TechCategory::Framework, check: Check::Header("x-powered-by", &RE_NEXTJS_HEADER) },
    TechnologySignature { name: "Next.js", category: TechCategory::Framework, check: Check::Html(&RE_NEXTJS) },
    TechnologySignature { name: "Nuxt.js", category: TechCategory::Framework, check: Check::Html(&RE_NUXTJS) },
    TechnologySignature { name: "Svelte", category: TechCategory::Framework, check: Check::Html(&RE_SVELTE) },
    TechnologySignature { name: "Gatsby", category: TechCategory::Framework, check: Check::Html(&RE_GATSBY) },
    TechnologySignature { name: "jQuery", category: TechCategory::Framework, check: Check::ScriptSrc(&RE_JQUERY) },
    TechnologySignature { name: "Bootstrap", category: TechCategory::Framework, check: Check::Html(&RE_BOOTSTRAP) },
    TechnologySignature { name: "Tailwind CSS", category: TechCategory::Framework, check: Check::Html(&RE_TAILWIND) },
    // Analytics
    TechnologySignature { name: "Google Analytics", category: TechCategory::Analytics, check: Check::Html(&RE_GOOGLE_ANALYTICS) },
    TechnologySignature { name: "Google Tag Manager", category: TechCategory::Analytics, check: Check::Html(&RE_GTM) },
    TechnologySignature { name: "Facebook Pixel", category: TechCategory::Analytics, check: Check::Html(&RE_FB_PIXEL) },
    TechnologySignature { name: "Hotjar", category: TechCategory::Analytics, check: Check::ScriptSrc(&RE_HOTJAR) },
    TechnologySignature { name: "Hotjar", category: TechCategory::Analytics, check: Check::Html(&RE_HOTJAR) },
    TechnologySignature { name: "Plausible", category: TechCategory::Analytics, check: Check::ScriptSrc(&RE_PLAUSIBLE) },
    TechnologySignature { name: "Segment", category: TechCategory::Analytics, check: Check::Html(&RE_SEGMENT) },
];

// --- Hosting providers ---

/// PTR hostname fragment → provider. Matched case-insensitively, first hit wins.
pub static HOSTING_PROVIDERS: &[(&str, &str)] = &[
    ("amazonaws.com", "Amazon"),
    ("cloudfront.net", "Amazon"),
    ("googleusercontent.com", "Google Cloud"),
    ("1e100.net", "Google"),
    ("digitalocean.com", "DigitalOcean"),
    ("linode.com", "Linode"),
    ("akamaitechnologies.com", "Akamai"),
    ("cloudflare", "Cloudflare"),
    ("fastly", "Fastly"),
    ("azure", "Microsoft Azure"),
    ("cloudapp.net", "Microsoft Azure"),
    ("hetzner", "Hetzner"),
    ("your-server.de", "Hetzner"),
    ("ovh", "OVH"),
    ("vultr.com", "Vultr"),
    ("github.io", "GitHub Pages"),
    ("githubusercontent.com", "GitHub"),
    ("netlify", "Netlify"),
    ("vercel", "Vercel"),
    ("heroku", "Heroku"),
    ("hostgator", "HostGator"),
    ("bluehost", "Bluehost"),
    ("godaddy", "GoDaddy"),
    ("secureserver.net", "GoDaddy"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_points_sum_to_one_hundred() {
        assert_eq!(SECURITY_HEADERS.iter().map(|h| h.points).sum::<u32>(), 100);
    }

    #[test]
    fn all_regexes_compile() {
        for sig in CDN_SIGNATURES {
            assert!(!sig.cname.is_match(""));
        }
        for sig in CMS_SIGNATURES {
            if let Some(re) = sig.header_version {
                assert!(!re.is_match(""));
            }
            if let Some(re) = sig.meta {
                assert!(!re.is_match(""));
            }
        }
        for sig in TECHNOLOGY_SIGNATURES {
            if let Check::Header(_, re) | Check::Html(re) | Check::ScriptSrc(re) = &sig.check {
                assert!(!re.is_match(""));
            }
        }
    }

    #[test]
    fn wordpress_meta_captures_version() {
        let html = r#"<meta name="generator" content="WordPress 6.4.2" />"#;
        let caps = RE_META_WORDPRESS.captures(html).unwrap();
        assert_eq!(caps.get(1).map(|m| m.as_str()), Some("6.4.2"));
    }
}
