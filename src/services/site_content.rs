//! Static copy the download flow hands to the frontend: the terms shown by
//! the gate and the first-run instructions for unsigned installers.

use serde::Serialize;
use crate::models::download_models::Platform;

#[derive(Debug, Clone, Serialize)]
pub struct TermsSection {
    pub number: u8,
    pub title: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TermsDocument {
    pub title: &'static str,
    pub summary: Vec<&'static str>,
    pub agreement_notice: &'static str,
    pub sections: Vec<TermsSection>,
    pub last_updated: &'static str,
}

const TERMS_SECTIONS: [(&str, &str); 11] = [
    (
        "Purpose of NavEye",
        "NavEye is a hands-free scrolling and navigation tool that uses camera-based facial and eye landmark detection. It is not designed for medical, safety-critical, emergency, or high-risk environments.",
    ),
    (
        "Safety Notice",
        "Detection may vary with lighting, camera quality, eyewear, or system performance. Do not use NavEye while driving, operating machinery, or in any activity where distraction could cause harm.",
    ),
    (
        "Health & Medical Disclaimer",
        "Sustained screen engagement may cause eye strain, headaches, or fatigue. NavEye is not a medical device; stop using it immediately if discomfort occurs.",
    ),
    (
        "Local Processing & Privacy",
        "All detection happens locally. No camera footage, facial data, or tracking information is uploaded, transmitted, or stored.",
    ),
    (
        "Permissions & System Access",
        "NavEye may request camera and accessibility access. These permissions only enable functionality and can be revoked in system settings.",
    ),
    (
        "No Automatic Updates",
        "NavEye never updates itself. Newer versions must be downloaded manually from the official website.",
    ),
    (
        "No Guarantee of Performance",
        "Scrolling accuracy and detection depend on hardware and environment and may be inconsistent across devices.",
    ),
    (
        "Acceptable Use",
        "Do not use NavEye for unlawful activity, to interfere with other systems, or to bypass OS-level security features.",
    ),
    (
        "Copyright & Ownership",
        "You may not copy, redistribute, sell, reverse engineer, or republish NavEye or its branding.",
    ),
    (
        "Limitation of Liability",
        "NavEye is provided \"AS IS\" without warranties. Its creators are not liable for data loss, device malfunction, discomfort, or unintended scrolling.",
    ),
    (
        "Indemnification",
        "You agree to hold NavEye and its developers harmless from claims resulting from misuse of the App or violation of these Terms.",
    ),
];

pub fn terms_document() -> TermsDocument {
    TermsDocument {
        title: "Terms & Conditions",
        summary: vec![
            "NavEye is a hands-free scrolling tool using eye tracking",
            "All processing happens locally, no data is uploaded",
            "Not for use while driving or operating machinery",
            "Take breaks to avoid eye strain",
        ],
        agreement_notice: "By clicking \"Agree & Download\", you confirm that you have read, understood, and accepted these Terms.",
        sections: TERMS_SECTIONS
            .iter()
            .enumerate()
            .map(|(i, &(title, body))| TermsSection {
                number: i as u8 + 1,
                title,
                body,
            })
            .collect(),
        last_updated: "January 2025",
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Troubleshooting {
    pub problem: &'static str,
    pub steps: Vec<&'static str>,
}

/// Shown after the download starts on a platform page.
#[derive(Debug, Clone, Serialize)]
pub struct SetupGuide {
    pub platform: Platform,
    pub title: &'static str,
    pub why_unsigned: &'static str,
    pub steps: Vec<&'static str>,
    pub troubleshooting: Vec<Troubleshooting>,
}

pub fn setup_guide(platform: Platform) -> SetupGuide {
    match platform {
        Platform::Mac => SetupGuide {
            platform,
            title: "Please Read Carefully - First Time Setup",
            why_unsigned: "NavEye is built by a student who couldn't afford the $99/year Apple Developer fee, so the app isn't notarized. Your Mac will show a security warning; the app is safe.",
            steps: vec![
                "Right-click (or Control-click) on the NavEye app",
                "Select \"Open\" from the context menu",
                "Click \"Open\" in the dialog that appears",
            ],
            troubleshooting: vec![
                Troubleshooting {
                    problem: "\"NavEye\" is damaged and can't be opened",
                    steps: vec![
                        "Open Terminal",
                        "Run: xattr -cr /Applications/NavEye.app",
                        "Open NavEye again",
                    ],
                },
                Troubleshooting {
                    problem: "NavEye needs camera permission",
                    steps: vec![
                        "System Preferences → Security & Privacy → Privacy → Camera",
                        "Check the box next to NavEye",
                        "Restart NavEye",
                    ],
                },
                Troubleshooting {
                    problem: "NavEye needs accessibility permission",
                    steps: vec![
                        "System Preferences → Security & Privacy → Privacy → Accessibility",
                        "Unlock, then check the box next to NavEye",
                        "Restart NavEye",
                    ],
                },
            ],
        },
        Platform::Windows => SetupGuide {
            platform,
            title: "Please Read Carefully - First Time Setup",
            why_unsigned: "NavEye is built by a student who couldn't afford a code signing certificate. Your PC will show a SmartScreen warning; the app is safe.",
            steps: vec![
                "When \"Windows protected your PC\" appears, click \"More info\"",
                "Click \"Run anyway\"",
                "Windows will remember your choice",
            ],
            troubleshooting: vec![
                Troubleshooting {
                    problem: "\"This app can't run on your PC\"",
                    steps: vec![
                        "Press Windows + I and open System → About",
                        "Confirm \"System type\" says 64-bit operating system",
                    ],
                },
                Troubleshooting {
                    problem: "Antivirus blocking NavEye",
                    steps: vec![
                        "Open your antivirus settings or exclusions",
                        "Add NavEye.exe to the exclusion list",
                        "Run NavEye again",
                    ],
                },
                Troubleshooting {
                    problem: "Camera not detected",
                    steps: vec![
                        "Check the webcam works in the Camera app",
                        "Settings → Privacy → Camera: allow desktop apps",
                        "Restart NavEye",
                    ],
                },
            ],
        },
    }
}
