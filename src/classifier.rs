use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Event id written for lines no specific rule claims.
pub const UNKNOWN_EVENT_ID: &str = "E0";
pub const UNKNOWN_TEMPLATE: &str = "Unknown Event: <*>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub time: String,
    pub level: String,
    pub content: String,
    pub event_id: String,
    pub event_template: String,
}

struct Rule {
    pattern: Regex,
    event_id: &'static str,
    template: &'static str,
    content: fn(&Captures) -> String,
}

fn rule(
    pattern: &str,
    event_id: &'static str,
    template: &'static str,
    content: fn(&Captures) -> String,
) -> Rule {
    Rule {
        pattern: Regex::new(pattern).unwrap(),
        event_id,
        template,
        content,
    }
}

// Ordered most-specific-first; the first matching rule wins, so declaration
// order is load-bearing. Group 1 is always the timestamp, group 2 the level.
// Known shadowing, kept in place deliberately: E23 never fires because E17/E18
// claim every LDAP/Digest notice first, and the first E25 alternative loses
// its bare `channel.jni` case to E11. Reordering would change precedence for
// inputs the original table never saw, so the order stays as declared.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            r"^\[(.*?)\] \[(notice)\] jk2_init\(\) Found child (\d+) in scoreboard slot (\d+)$",
            "E1",
            "jk2_init() Found child <*> in scoreboard slot <*>",
            |m| format!("jk2_init() Found child {} in scoreboard slot {}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] workerEnv\.init\(\) ok (.*)$",
            "E2",
            "workerEnv.init() ok <*>",
            |m| format!("workerEnv.init() ok {}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] mod_jk child workerEnv in error state (\d+)$",
            "E3",
            "mod_jk child workerEnv in error state <*>",
            |m| format!("mod_jk child workerEnv in error state {}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] \[client (.*?)\] Directory index forbidden by rule: (.*)$",
            "E4",
            "[client <*>] Directory index forbidden by rule: <*>",
            |m| format!("[client {}] Directory index forbidden by rule: {}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] jk2_init\(\) Can't find child (\d+) in scoreboard$",
            "E5",
            "jk2_init() Can't find child <*> in scoreboard",
            |m| format!("jk2_init() Can't find child {} in scoreboard", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] mod_jk child init (\d+) (-?\d+)$",
            "E6",
            "mod_jk child init <*> <*>",
            |m| format!("mod_jk child init {} {}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] Apache/.*? configured -- resuming normal operations$",
            "E7",
            "Apache/<?> configured -- resuming normal operations",
            |_| "Apache/<?> configured -- resuming normal operations".to_string(),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] Graceful restart requested, doing restart$",
            "E8",
            "Graceful restart requested, doing restart",
            |_| "Graceful restart requested, doing restart".to_string(),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] mod_jk2 Shutting down$",
            "E9",
            "mod_jk2 Shutting down",
            |_| "mod_jk2 Shutting down".to_string(),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] env\.createBean2\(\): Factory error creating channel\.jni:jni \( channel\.jni, jni\)$",
            "E10",
            "env.createBean2(): Factory error creating channel.jni:jni ( channel.jni, jni)",
            |_| "env.createBean2(): Factory error creating channel.jni:jni ( channel.jni, jni)".to_string(),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] config\.update\(\): Can't create channel\.jni:jni$",
            "E11",
            "config.update(): Can't create channel.jni:jni",
            |_| "config.update(): Can't create channel.jni:jni".to_string(),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] env\.createBean2\(\): Factory error creating vm: \( vm, \)$",
            "E12",
            "env.createBean2(): Factory error creating vm: ( vm, )",
            |_| "env.createBean2(): Factory error creating vm: ( vm, )".to_string(),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] Invalid method in request(.*)$",
            "E13",
            "Invalid method in request",
            |m| format!("Invalid method in request{}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] request failed: URI too long \(longer than (\d+)\)$",
            "E14",
            "request failed: URI too long (longer than <*>)",
            |m| format!("request failed: URI too long (longer than {})", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] attempt to invoke directory as script: (.*)$",
            "E15",
            "attempt to invoke directory as script: <*>",
            |m| format!("attempt to invoke directory as script: {}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] request failed: error reading the headers$",
            "E16",
            "request failed: error reading the headers",
            |_| "request failed: error reading the headers".to_string(),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] LDAP: (.*)$",
            "E17",
            "LDAP: <*>",
            |m| format!("LDAP: {}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] Digest: (.*)$",
            "E18",
            "Digest: <*>",
            |m| format!("Digest: {}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] suEXEC mechanism enabled \(wrapper: (.*)\)$",
            "E19",
            "suEXEC mechanism enabled (wrapper: <*>)",
            |m| format!("suEXEC mechanism enabled (wrapper: {})", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] mod_python: (.*)$",
            "E20",
            "mod_python: <*>",
            |m| format!("mod_python: {}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] mod_security/(.*) configured$",
            "E21",
            "mod_security/<?> configured",
            |m| format!("mod_security/{} configured", &m[3]),
        ),
        // Very general; must stay behind the client-scoped file rules below it
        // would otherwise absorb.
        rule(
            r"^\[(.*?)\] \[(error)\] File does not exist: (.*)$",
            "E22",
            "File does not exist: <*>",
            |m| format!("File does not exist: {}", &m[3]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] (LDAP|Digest): (.*)$",
            "E23",
            "<LDAP/Digest Type>: <*>",
            |m| format!("{}: {}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(notice)\] (mod_python|mod_security)/(.*)$",
            "E24",
            "<Module Type>/<?>: <*>",
            |m| format!("{}/{}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] config\.update\(\): Can't create (channel\.jni|vm|worker\.jni:onStartup|worker\.jni:onShutdown)(.*)$",
            "E25",
            "config.update(): Can't create <component_type><optional_details>",
            |m| format!("config.update(): Can't create {}{}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] env\.createBean2\(\): Factory error creating (channel\.jni:jni|vm): (.*)$",
            "E25",
            "env.createBean2(): Factory error creating <bean_type>: <details>",
            |m| format!("env.createBean2(): Factory error creating {}: {}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] \[client (.*?)\] script not found or unable to stat: (.*)$",
            "E27",
            "[client <*>] script not found or unable to stat: <*>",
            |m| format!("[client {}] script not found or unable to stat: {}", &m[3], &m[4]),
        ),
        rule(
            r"^\[(.*?)\] \[(error)\] \[client (.*?)\] File does not exist: /var/www/html/(phpmyadmin|cacti|openwebmail|wordpress|drupal|phpgroupware|mambo|oscommerce|osc|osCommerce|catalog|admin|store|onlineshop|shop|b2|b2evo|community|bbs|zboard|msgboard|talk|chat|cvs|articles|WebCalendar|webcalendar|awstats-cgibin|aws|awstats/cgi-bin|awstats/awstats\.|awstats\.pl|ip1\.cgi|modules|Forums|bin|twiki|mute|level|NULL\.printer|scripts/nsiislog\.dll|sumthin|scripts/root\.exe|MSADC|c|d|scripts/\.\.%5c\.\.|scripts/\.\.\\xc1\\x1c\.\.|scripts/\.\.\\xc0\\xaf\.\.|scripts/\.\.\\xc1\\x9c\.\.|scripts/\.\.%2f\.\.|scripts/\.\.%5c%5c\.\.|scripts/root\.exe\?/c\+dir|scripts/\.\.%252e/\.\.%252e/winnt/system32/cmd\.exe\?/c\+dir|scripts/\.\.%35c../winnt/system32/cmd\.exe\?/c\+dir|scripts/\.\.%e0%80%af../\.\.%e0%80%af../\.\.%e0%80%af../winnt/system32/cmd\.exe\?/c\+dir|scripts/\.\.%.*?)(.*)$",
            "E28",
            "File does not exist: /var/www/html/<application_path>",
            |m| format!("File does not exist: /var/www/html/{}{}", &m[4], &m[5]),
        ),
    ]
});

// Fallbacks are anchored at the start only; anything after the two bracketed
// fields is free text by definition.
static RE_BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(.*?)\] \[(.*?)\] (.*)$").unwrap());

/// Classify one raw log line. Total: every input yields exactly one record,
/// degrading to the E0 sentinel when nothing matches.
pub fn classify(line: &str) -> Classification {
    for r in RULES.iter() {
        if let Some(m) = r.pattern.captures(line) {
            return Classification {
                time: m[1].to_string(),
                level: m[2].to_string(),
                content: (r.content)(&m),
                event_id: r.event_id.to_string(),
                event_template: r.template.to_string(),
            };
        }
    }
    if let Some(m) = RE_BRACKETED.captures(line) {
        return Classification {
            time: m[1].to_string(),
            level: m[2].to_string(),
            content: m[3].trim().to_string(),
            event_id: UNKNOWN_EVENT_ID.to_string(),
            event_template: UNKNOWN_TEMPLATE.to_string(),
        };
    }
    // No bracketed prefix at all.
    Classification {
        time: String::new(),
        level: String::new(),
        content: line.trim().to_string(),
        event_id: UNKNOWN_EVENT_ID.to_string(),
        event_template: UNKNOWN_TEMPLATE.to_string(),
    }
}
