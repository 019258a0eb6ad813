use crate::archive::EntryFilter;
use crate::platform::{Arch, Os, Platform};

/// Per-tool descriptor: where releases are discovered, how the download URL is
/// obtained, what the payload looks like and which binaries it yields. All
/// tool-specific behavior lives in this table; the pipeline itself is generic.
#[derive(Debug)]
pub struct ToolDef {
    pub name: &'static str,
    pub discovery: Discovery,
    pub download: Download,
    pub archive: ArchiveKind,
    /// Binaries sharing one versioned extraction directory; the first is the
    /// one checked for cache hits.
    pub binaries: &'static [&'static str],
    pub arch_labels: ArchLabels,
    /// OS/arch pairs this tool's upstream does not publish for.
    pub unsupported: &'static [(Os, Arch)],
}

#[derive(Debug)]
pub enum Discovery {
    /// Paged GitHub REST releases listing.
    GithubReleases {
        owner: &'static str,
        repo: &'static str,
    },
    /// HashiCorp releases HTML directory index.
    HashicorpIndex { product: &'static str },
    /// goteleport.com build-id manifest.
    TeleportManifest,
}

#[derive(Debug)]
pub enum Download {
    /// URL template; supports {tag}, {version}, {os} and {arch}.
    Template(&'static str),
    /// URL comes from the release map produced by discovery.
    FromDiscovery,
}

#[derive(Debug)]
pub enum ArchiveKind {
    TarGz { filter: Option<TarFilter> },
    Zip,
    /// The asset is the binary itself, no unpacking.
    RawBinary,
}

/// Entry filter for fat tar.gz archives. Both fields support {os}/{arch}
/// placeholders. `matches` selects entries, `strip` is removed from the
/// front of the output path.
#[derive(Debug)]
pub struct TarFilter {
    pub matches: &'static str,
    pub strip: &'static str,
}

/// How the tool's upstream labels architectures in asset names.
#[derive(Debug, Clone, Copy)]
pub enum ArchLabels {
    Standard,
    /// bronze1man assets call arm64 "arm".
    LegacyArm,
}

pub const TOOLS: &[ToolDef] = &[
    ToolDef {
        name: "terraform",
        discovery: Discovery::HashicorpIndex {
            product: "terraform",
        },
        download: Download::Template(
            "https://releases.hashicorp.com/terraform/{version}/terraform_{version}_{os}_{arch}.zip",
        ),
        archive: ArchiveKind::Zip,
        binaries: &["terraform"],
        arch_labels: ArchLabels::Standard,
        unsupported: &[],
    },
    ToolDef {
        name: "opentofu",
        discovery: Discovery::GithubReleases {
            owner: "opentofu",
            repo: "opentofu",
        },
        download: Download::Template(
            "https://github.com/opentofu/opentofu/releases/download/{tag}/tofu_{version}_{os}_{arch}.tar.gz",
        ),
        archive: ArchiveKind::TarGz { filter: None },
        binaries: &["tofu"],
        arch_labels: ArchLabels::Standard,
        unsupported: &[],
    },
    ToolDef {
        name: "helm",
        discovery: Discovery::GithubReleases {
            owner: "helm",
            repo: "helm",
        },
        download: Download::Template("https://get.helm.sh/helm-{tag}-{os}-{arch}.tar.gz"),
        archive: ArchiveKind::TarGz {
            // helm tarballs nest everything under a {os}-{arch}/ directory
            filter: Some(TarFilter {
                matches: "{os}-{arch}",
                strip: "{os}-{arch}/",
            }),
        },
        binaries: &["helm"],
        arch_labels: ArchLabels::Standard,
        unsupported: &[],
    },
    ToolDef {
        name: "kubectl",
        discovery: Discovery::GithubReleases {
            owner: "kubernetes",
            repo: "kubernetes",
        },
        download: Download::Template("https://dl.k8s.io/release/{tag}/bin/{os}/{arch}/kubectl"),
        archive: ArchiveKind::RawBinary,
        binaries: &["kubectl"],
        arch_labels: ArchLabels::Standard,
        unsupported: &[],
    },
    ToolDef {
        name: "teleport",
        discovery: Discovery::TeleportManifest,
        download: Download::FromDiscovery,
        archive: ArchiveKind::TarGz {
            // the bundle nests under teleport/; "teleport/t" narrows to the
            // tbot/tctl/teleport/tsh binaries and skips examples
            filter: Some(TarFilter {
                matches: "teleport/t",
                strip: "teleport/",
            }),
        },
        binaries: &["teleport", "tbot", "tctl", "tsh"],
        arch_labels: ArchLabels::Standard,
        unsupported: &[],
    },
    ToolDef {
        name: "jsonui",
        discovery: Discovery::GithubReleases {
            owner: "gulyasm",
            repo: "jsonui",
        },
        download: Download::Template(
            "https://github.com/gulyasm/jsonui/releases/download/{tag}/jsonui_{os}_{arch}",
        ),
        archive: ArchiveKind::RawBinary,
        binaries: &["jsonui"],
        arch_labels: ArchLabels::Standard,
        unsupported: &[],
    },
    ToolDef {
        name: "json2yaml",
        discovery: Discovery::GithubReleases {
            owner: "bronze1man",
            repo: "json2yaml",
        },
        download: Download::Template(
            "https://github.com/bronze1man/json2yaml/releases/download/{version}/json2yaml_{os}_{arch}",
        ),
        archive: ArchiveKind::RawBinary,
        binaries: &["json2yaml"],
        arch_labels: ArchLabels::LegacyArm,
        unsupported: &[(Os::Darwin, Arch::Arm64)],
    },
    ToolDef {
        name: "yaml2json",
        discovery: Discovery::GithubReleases {
            owner: "bronze1man",
            repo: "yaml2json",
        },
        download: Download::Template(
            "https://github.com/bronze1man/yaml2json/releases/download/{version}/yaml2json_{os}_{arch}",
        ),
        archive: ArchiveKind::RawBinary,
        binaries: &["yaml2json"],
        arch_labels: ArchLabels::LegacyArm,
        unsupported: &[(Os::Darwin, Arch::Arm64)],
    },
];

pub fn find(name: &str) -> Option<&'static ToolDef> {
    TOOLS.iter().find(|t| t.name == name)
}

pub fn names() -> Vec<&'static str> {
    TOOLS.iter().map(|t| t.name).collect()
}

impl ToolDef {
    pub fn primary_binary(&self) -> &'static str {
        self.binaries[0]
    }

    pub fn supports(&self, platform: &Platform) -> bool {
        !self.unsupported.contains(&(platform.os, platform.arch))
    }

    pub fn arch_label(&self, arch: Arch) -> &'static str {
        match (self.arch_labels, arch) {
            (ArchLabels::LegacyArm, Arch::Arm64) => "arm",
            _ => arch.name(),
        }
    }

    /// Substitutes {os} and {arch} with this tool's labels for the platform.
    pub fn expand(&self, template: &str, platform: &Platform) -> String {
        template
            .replace("{os}", platform.os.name())
            .replace("{arch}", self.arch_label(platform.arch))
    }

    /// Renders a download URL template for the requested version string.
    /// {tag} is the version as given; {version} has a leading 'v' stripped.
    pub fn render_url(&self, template: &str, tag: &str, platform: &Platform) -> String {
        self.expand(template, platform)
            .replace("{tag}", tag)
            .replace("{version}", tag.trim_start_matches('v'))
    }
}

impl TarFilter {
    pub fn render(&self, tool: &ToolDef, platform: &Platform) -> EntryFilter {
        EntryFilter {
            matches: tool.expand(self.matches, platform),
            strip: tool.expand(self.strip, platform),
        }
    }
}
