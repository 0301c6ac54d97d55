use crate::scoring::{AssessmentKind, RiskLevel};

/// Fixed advisory text per (questionnaire kind, risk tier). Lookup
/// data only; the tier is the sole input, never the answer content.
#[derive(Debug, Clone, Copy)]
pub struct AdviceSet {
    pub recommendations: [&'static str; 3],
    pub next_steps: [&'static str; 3],
}

static MCHAT_LOW: AdviceSet = AdviceSet {
    recommendations: [
        "Your child's responses do not indicate elevated autism risk at this time.",
        "Continue engaging your child in everyday play, talk, and shared routines.",
        "Keep an eye on social milestones such as pointing, eye contact, and pretend play.",
    ],
    next_steps: [
        "Repeat the screening at the next scheduled well-child visit.",
        "Mention any new concerns to your pediatrician when they arise.",
        "Encourage interactive games that involve taking turns and imitation.",
    ],
};

static MCHAT_MEDIUM: AdviceSet = AdviceSet {
    recommendations: [
        "Some responses suggest your child may benefit from closer developmental monitoring.",
        "A follow-up interview can clarify whether the flagged behaviours are consistent.",
        "Early conversation with a professional helps even when results are borderline.",
    ],
    next_steps: [
        "Schedule a follow-up screening within the next one to two months.",
        "Discuss the flagged items with your pediatrician or family doctor.",
        "Note specific situations where the flagged behaviours occur, to share at the visit.",
    ],
};

static MCHAT_HIGH: AdviceSet = AdviceSet {
    recommendations: [
        "The responses indicate an elevated likelihood of autism spectrum concerns.",
        "A formal diagnostic evaluation by a specialist is strongly advised.",
        "Starting early intervention does not require waiting for a formal diagnosis.",
    ],
    next_steps: [
        "Request a referral to a developmental pediatrician or child psychologist.",
        "Contact your regional early-intervention program for an intake appointment.",
        "Gather observations from caregivers and teachers to bring to the evaluation.",
    ],
};

static MOTOR_LOW: AdviceSet = AdviceSet {
    recommendations: [
        "Motor development appears on track for your child's age group.",
        "Keep offering varied physical play, both fine-motor and whole-body.",
        "Strength and coordination grow fastest through unstructured active play.",
    ],
    next_steps: [
        "Continue daily active play such as climbing, drawing, and ball games.",
        "Re-screen at the next age band to confirm steady progress.",
        "Introduce slightly harder motor challenges as current ones become easy.",
    ],
};

static MOTOR_MEDIUM: AdviceSet = AdviceSet {
    recommendations: [
        "Some motor skills are developing more slowly than expected for this age group.",
        "Targeted practice at home often closes small gaps within a few months.",
        "A paediatric check can rule out vision, tone, or strength issues.",
    ],
    next_steps: [
        "Practise the weaker skill areas through short daily play sessions.",
        "Re-run this checklist in eight to twelve weeks to measure change.",
        "Raise the results with your pediatrician at the next visit.",
    ],
};

static MOTOR_HIGH: AdviceSet = AdviceSet {
    recommendations: [
        "Several motor skills fall well below the expected range for this age group.",
        "A professional motor assessment is recommended rather than waiting it out.",
        "Early occupational or physical therapy markedly improves outcomes.",
    ],
    next_steps: [
        "Request a referral to a paediatric occupational or physical therapist.",
        "Ask your pediatrician about a full developmental motor evaluation.",
        "Keep a short video diary of the difficult movements to show the assessor.",
    ],
};

static SPEECH_LOW: AdviceSet = AdviceSet {
    recommendations: [
        "Speech and language skills appear age-appropriate.",
        "Rich daily conversation remains the best support for continued growth.",
        "Reading together builds vocabulary faster than any structured drill.",
    ],
    next_steps: [
        "Keep up daily shared reading and back-and-forth conversation.",
        "Re-screen at the next age band or if regression is ever noticed.",
        "Expand on your child's utterances by adding one or two words.",
    ],
};

static SPEECH_MEDIUM: AdviceSet = AdviceSet {
    recommendations: [
        "Some speech and language behaviours occur less often than expected for this age.",
        "Many children catch up with focused language stimulation at home.",
        "A hearing check is worthwhile whenever language is the lagging area.",
    ],
    next_steps: [
        "Book a hearing test to rule out undetected hearing loss.",
        "Set aside dedicated one-on-one talk time without screens each day.",
        "Re-run this checklist in two to three months and compare results.",
    ],
};

static SPEECH_HIGH: AdviceSet = AdviceSet {
    recommendations: [
        "Speech and language development appears significantly delayed for this age group.",
        "A speech-language pathologist should evaluate your child directly.",
        "Therapy begun before school age produces the strongest gains.",
    ],
    next_steps: [
        "Request a referral to a certified speech-language pathologist.",
        "Arrange a full audiology assessment alongside the speech evaluation.",
        "List the words and phrases your child uses now, to bring to the appointment.",
    ],
};

static SOCIAL_LOW: AdviceSet = AdviceSet {
    recommendations: [
        "Social skills appear to be developing well for your child's age.",
        "Regular play with peers keeps these skills moving forward.",
        "Modelling sharing and turn-taking at home reinforces what you see.",
    ],
    next_steps: [
        "Keep providing chances to play with children of a similar age.",
        "Re-screen at the next age band to confirm continued progress.",
        "Praise cooperative moments specifically when you notice them.",
    ],
};

static SOCIAL_MEDIUM: AdviceSet = AdviceSet {
    recommendations: [
        "Some social behaviours occur less often than expected for this age group.",
        "Structured small-group play can give these skills room to practise.",
        "Teachers and caregivers can confirm whether the pattern holds elsewhere.",
    ],
    next_steps: [
        "Arrange regular playdates or small-group activities each week.",
        "Ask your child's teacher or caregiver to complete the same checklist.",
        "Re-run this screening in two to three months to measure change.",
    ],
};

static SOCIAL_HIGH: AdviceSet = AdviceSet {
    recommendations: [
        "Social development appears significantly behind expectations for this age group.",
        "A professional evaluation can distinguish shyness from a broader concern.",
        "Early social-skills support is most effective before school entry.",
    ],
    next_steps: [
        "Request a referral to a child psychologist or developmental specialist.",
        "Share these results with your child's school or daycare for their input.",
        "Enrol in a facilitated social-skills playgroup if one is available locally.",
    ],
};

pub fn advice_for(kind: AssessmentKind, risk: RiskLevel) -> &'static AdviceSet {
    match (kind, risk) {
        (AssessmentKind::Mchat, RiskLevel::Low) => &MCHAT_LOW,
        (AssessmentKind::Mchat, RiskLevel::Medium) => &MCHAT_MEDIUM,
        (AssessmentKind::Mchat, RiskLevel::High) => &MCHAT_HIGH,
        (AssessmentKind::MotorSkills, RiskLevel::Low) => &MOTOR_LOW,
        (AssessmentKind::MotorSkills, RiskLevel::Medium) => &MOTOR_MEDIUM,
        (AssessmentKind::MotorSkills, RiskLevel::High) => &MOTOR_HIGH,
        (AssessmentKind::SpeechLanguage, RiskLevel::Low) => &SPEECH_LOW,
        (AssessmentKind::SpeechLanguage, RiskLevel::Medium) => &SPEECH_MEDIUM,
        (AssessmentKind::SpeechLanguage, RiskLevel::High) => &SPEECH_HIGH,
        (AssessmentKind::SocialSkills, RiskLevel::Low) => &SOCIAL_LOW,
        (AssessmentKind::SocialSkills, RiskLevel::Medium) => &SOCIAL_MEDIUM,
        (AssessmentKind::SocialSkills, RiskLevel::High) => &SOCIAL_HIGH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: [AssessmentKind; 4] = [
        AssessmentKind::Mchat,
        AssessmentKind::MotorSkills,
        AssessmentKind::SpeechLanguage,
        AssessmentKind::SocialSkills,
    ];
    const ALL_TIERS: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    #[test]
    fn every_cell_has_non_empty_text() {
        for kind in ALL_KINDS {
            for tier in ALL_TIERS {
                let set = advice_for(kind, tier);
                for s in set.recommendations.iter().chain(set.next_steps.iter()) {
                    assert!(!s.trim().is_empty(), "{:?}/{:?}", kind, tier);
                }
            }
        }
    }

    #[test]
    fn tiers_within_a_kind_give_distinct_advice() {
        for kind in ALL_KINDS {
            let low = advice_for(kind, RiskLevel::Low);
            let medium = advice_for(kind, RiskLevel::Medium);
            let high = advice_for(kind, RiskLevel::High);
            assert_ne!(low.recommendations, medium.recommendations);
            assert_ne!(medium.recommendations, high.recommendations);
            assert_ne!(low.next_steps, high.next_steps);
        }
    }
}
